//! Minimal `printf`-style formatter.
//!
//! Understands `%d`, `%x`, `%p`, `%s` and `%%`. Output goes byte by byte to
//! an emitter so the console can render it under its own lock.

use super::Fault;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// One argument consumed by a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    /// Signed integer, for `%d`.
    Int(i32),
    /// Unsigned integer, for `%d` and `%x`.
    Uint(u32),
    /// Address, for `%p` and `%x`.
    Ptr(usize),
    /// String, for `%s`; `None` prints `(null)`.
    Str(Option<&'a str>),
}

/// Expands `fmt` with `args`, handing every output byte to `emit`.
///
/// A directive without a matching argument is emitted literally. The
/// argument it looked at is still used up.
pub(crate) fn format<F>(fmt: Option<&str>, args: &[Arg<'_>], mut emit: F) -> Result<(), Fault>
where
    F: FnMut(u8) -> Result<(), Fault>,
{
    let fmt = fmt.ok_or(Fault::NullFormat)?;
    let mut args = args.iter();
    let mut bytes = fmt.bytes();

    while let Some(byte) = bytes.next() {
        if byte != b'%' {
            emit(byte)?;
            continue;
        }

        let Some(directive) = bytes.next() else {
            break;
        };

        match directive {
            b'%' => emit(b'%')?,
            b'd' | b'x' | b'p' | b's' => match (directive, args.next()) {
                (b'd', Some(Arg::Int(v))) => signed(i64::from(*v), &mut emit)?,
                (b'd', Some(Arg::Uint(v))) => unsigned(u64::from(*v), 10, &mut emit)?,
                (b'x' | b'p', Some(Arg::Int(v))) => unsigned(u64::from(*v as u32), 16, &mut emit)?,
                (b'x' | b'p', Some(Arg::Uint(v))) => unsigned(u64::from(*v), 16, &mut emit)?,
                (b'x' | b'p', Some(Arg::Ptr(v))) => unsigned(*v as u64, 16, &mut emit)?,
                (b's', Some(Arg::Str(s))) => {
                    for byte in s.unwrap_or("(null)").bytes() {
                        emit(byte)?;
                    }
                }
                _ => {
                    emit(b'%')?;
                    emit(directive)?;
                }
            },
            other => {
                emit(b'%')?;
                emit(other)?;
            }
        }
    }

    Ok(())
}

fn signed<F>(value: i64, emit: &mut F) -> Result<(), Fault>
where
    F: FnMut(u8) -> Result<(), Fault>,
{
    if value < 0 {
        emit(b'-')?;
    }
    unsigned(value.unsigned_abs(), 10, emit)
}

fn unsigned<F>(mut value: u64, base: u64, emit: &mut F) -> Result<(), Fault>
where
    F: FnMut(u8) -> Result<(), Fault>,
{
    let mut buf = [0u8; 20];
    let mut len = 0;
    loop {
        buf[len] = DIGITS[(value % base) as usize];
        len += 1;
        value /= base;
        if value == 0 {
            break;
        }
    }

    for &digit in buf[..len].iter().rev() {
        emit(digit)?;
    }
    Ok(())
}
