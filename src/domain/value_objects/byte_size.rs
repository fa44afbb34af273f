//! Human-friendly byte counts

const UNITS: &[&str] = &["bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB"];

/// A byte count that displays with binary units
///
/// `0 bytes`, `512 bytes`, `1.5 KB`, `2 MB`. One decimal place is kept
/// unless it is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn bytes(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for ByteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut num = self.0 as f64;
        for unit in UNITS {
            if num < 1024.0 {
                return write!(f, "{} {}", friendly_decimal(num), unit);
            }
            num /= 1024.0;
        }
        write!(f, "{} YB", friendly_decimal(num))
    }
}

fn friendly_decimal(num: f64) -> String {
    let rounded = (num * 10.0).round() / 10.0;
    if (rounded * 10.0).round() as u64 % 10 == 0 {
        format!("{}", rounded.round() as u64)
    } else {
        format!("{:.1}", rounded)
    }
}
