//! Error decoding into the host's numeric errno domain.
//!
//! Capability providers report failures in whatever shape they like: a raw
//! number, a symbolic name (`"ENOENT"`), or a structured object carrying a
//! `code` or `errno` field. The host only understands negative errno values,
//! so everything funnels through [`decode_error`].

use fusefs_types::Value;

/// Fallback code for values that carry no recognisable errno.
pub const UNKNOWN_ERRNO: i64 = -1;

/// Symbolic errno names and their platform values.
const ERRNO_NAMES: &[(&str, i32)] = &[
    ("EPERM", libc::EPERM),
    ("ENOENT", libc::ENOENT),
    ("ESRCH", libc::ESRCH),
    ("EINTR", libc::EINTR),
    ("EIO", libc::EIO),
    ("ENXIO", libc::ENXIO),
    ("E2BIG", libc::E2BIG),
    ("ENOEXEC", libc::ENOEXEC),
    ("EBADF", libc::EBADF),
    ("ECHILD", libc::ECHILD),
    ("EAGAIN", libc::EAGAIN),
    ("EWOULDBLOCK", libc::EWOULDBLOCK),
    ("ENOMEM", libc::ENOMEM),
    ("EACCES", libc::EACCES),
    ("EFAULT", libc::EFAULT),
    ("ENOTBLK", libc::ENOTBLK),
    ("EBUSY", libc::EBUSY),
    ("EEXIST", libc::EEXIST),
    ("EXDEV", libc::EXDEV),
    ("ENODEV", libc::ENODEV),
    ("ENOTDIR", libc::ENOTDIR),
    ("EISDIR", libc::EISDIR),
    ("EINVAL", libc::EINVAL),
    ("ENFILE", libc::ENFILE),
    ("EMFILE", libc::EMFILE),
    ("ENOTTY", libc::ENOTTY),
    ("ETXTBSY", libc::ETXTBSY),
    ("EFBIG", libc::EFBIG),
    ("ENOSPC", libc::ENOSPC),
    ("ESPIPE", libc::ESPIPE),
    ("EROFS", libc::EROFS),
    ("EMLINK", libc::EMLINK),
    ("EPIPE", libc::EPIPE),
    ("EDOM", libc::EDOM),
    ("ERANGE", libc::ERANGE),
    ("EDEADLK", libc::EDEADLK),
    ("ENAMETOOLONG", libc::ENAMETOOLONG),
    ("ENOLCK", libc::ENOLCK),
    ("ENOSYS", libc::ENOSYS),
    ("ENOTEMPTY", libc::ENOTEMPTY),
    ("ELOOP", libc::ELOOP),
    ("ENOMSG", libc::ENOMSG),
    ("EIDRM", libc::EIDRM),
    ("ENOTSUP", libc::ENOTSUP),
    ("EOPNOTSUPP", libc::EOPNOTSUPP),
    ("EOVERFLOW", libc::EOVERFLOW),
    ("EILSEQ", libc::EILSEQ),
    ("ENOTSOCK", libc::ENOTSOCK),
    ("EADDRINUSE", libc::EADDRINUSE),
    ("ECONNREFUSED", libc::ECONNREFUSED),
    ("ECONNRESET", libc::ECONNRESET),
    ("ENOTCONN", libc::ENOTCONN),
    ("ETIMEDOUT", libc::ETIMEDOUT),
    ("EALREADY", libc::EALREADY),
    ("EINPROGRESS", libc::EINPROGRESS),
    ("ESTALE", libc::ESTALE),
    ("EDQUOT", libc::EDQUOT),
    ("EPROTO", libc::EPROTO),
    ("ECANCELED", libc::ECANCELED),
];

/// Translate a symbolic errno name into its negated platform value.
///
/// Matching is case-insensitive. Unknown names yield [`UNKNOWN_ERRNO`].
pub fn errno_of(name: &str) -> i64 {
    ERRNO_NAMES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, code)| -i64::from(*code))
        .unwrap_or(UNKNOWN_ERRNO)
}

/// Decode an arbitrary error value into a numeric errno.
///
/// Rules, first match wins:
/// - number: returned as-is; fractional floats truncate toward zero
/// - string: symbolic name lookup
/// - object with a string `code`: symbolic name lookup on the code
/// - object with a numeric `errno`: that number, same rule as above
/// - anything else: [`UNKNOWN_ERRNO`]
pub fn decode_error(err: &Value) -> i64 {
    match err {
        Value::Int(_) | Value::Float(_) => numeric(err),
        Value::Str(name) => errno_of(name),
        Value::Object(fields) => {
            if let Some(Value::Str(code)) = fields.get("code") {
                errno_of(code)
            } else if let Some(errno @ (Value::Int(_) | Value::Float(_))) = fields.get("errno") {
                numeric(errno)
            } else {
                UNKNOWN_ERRNO
            }
        }
        _ => UNKNOWN_ERRNO,
    }
}

fn numeric(value: &Value) -> i64 {
    value.as_i64().unwrap_or(UNKNOWN_ERRNO)
}
