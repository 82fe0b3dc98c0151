//! Open-flag decoding.
//!
//! The host hands `open` a POSIX flag bitmask; capability providers expect a
//! mode string in the `fopen` family (`"r"`, `"w+"`, `"ax"`, ...).

pub const O_RDONLY: i64 = 0;
pub const O_WRONLY: i64 = 1;
pub const O_RDWR: i64 = 2;
pub const O_CREAT: i64 = 64;
pub const O_EXCL: i64 = 128;
pub const O_APPEND: i64 = 1024;

/// Access-mode bits.
pub const O_ACCMODE: i64 = 3;

/// Decode a host open-flag bitmask into a mode string.
///
/// Read-only access always yields `"r"`. Otherwise the base letter is `r`
/// without `O_CREAT`, `a` with `O_CREAT | O_APPEND`, and `w` with `O_CREAT`
/// alone; `x` follows for `O_EXCL` and `+` for `O_RDWR`.
pub fn decode_flags(flags: i64) -> &'static str {
    if flags & O_ACCMODE == O_RDONLY {
        return "r";
    }

    let base = if flags & O_CREAT == 0 {
        'r'
    } else if flags & O_APPEND != 0 {
        'a'
    } else {
        'w'
    };
    let exclusive = flags & O_EXCL != 0;
    let read_write = flags & O_RDWR != 0;

    match (base, exclusive, read_write) {
        ('r', false, false) => "r",
        ('r', false, true) => "r+",
        ('r', true, false) => "rx",
        ('r', true, true) => "rx+",
        ('w', false, false) => "w",
        ('w', false, true) => "w+",
        ('w', true, false) => "wx",
        ('w', true, true) => "wx+",
        ('a', false, false) => "a",
        ('a', false, true) => "a+",
        ('a', true, false) => "ax",
        (_, _, _) => "ax+",
    }
}
