use super::{errors, Result};

/// Tries to cast the sample to a 16-bit signed integer, returning an error on overflow.
#[inline(always)]
pub fn narrow_to_i16(x: i32) -> Result<i16> {
    if x < i16::MIN as i32 || x > i16::MAX as i32 {
        errors::malformed_error::<i16>("sample too wide to cast to i16")
    } else {
        Ok(x as i16)
    }
}

#[test]
fn test_narrow_to_i16() {
    assert!(narrow_to_i16(32767).is_ok());
    assert!(narrow_to_i16(32768).is_err());
    assert!(narrow_to_i16(-32768).is_ok());
    assert!(narrow_to_i16(-32769).is_err());
}

/// Tries to cast the sample to a 24-bit signed integer, returning an error on overflow.
#[inline(always)]
pub fn narrow_to_i24(x: i32) -> Result<i32> {
    if x < -(1 << 23) || x > (1 << 23) - 1 {
        errors::malformed_error::<i32>("sample too wide to cast to i24")
    } else {
        Ok(x)
    }
}

#[test]
fn test_narrow_to_i24() {
    assert!(narrow_to_i24(8_388_607).is_ok());
    assert!(narrow_to_i24(8_388_608).is_err());
    assert!(narrow_to_i24(-8_388_608).is_ok());
    assert!(narrow_to_i24(-8_388_609).is_err());
}
