/// The 8XYn register-to-register operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AluMode {
    Load = 0x0,
    Or = 0x1,
    And = 0x2,
    Xor = 0x3,
    Add = 0x4,
    Sub = 0x5,
    Shr = 0x6,
    SubN = 0x7,
    Shl = 0xE,
}

/// Runs `mode` over VX and VY. The second half of the result is the new VF,
/// or `None` where the operation leaves VF alone.
pub fn apply(mode: AluMode, vx: u8, vy: u8) -> (u8, Option<u8>) {
    match mode {
        AluMode::Load => (vy, None),
        AluMode::Or => (vx | vy, None),
        AluMode::And => (vx & vy, None),
        AluMode::Xor => (vx ^ vy, None),
        AluMode::Add => with_flag(add(vx, vy)),
        AluMode::Sub => with_flag(sub(vx, vy)),
        AluMode::Shr => with_flag(shr(vx)),
        AluMode::SubN => with_flag(sub(vy, vx)),
        AluMode::Shl => with_flag(shl(vx)),
    }
}

fn with_flag((result, flag): (u8, u8)) -> (u8, Option<u8>) {
    (result, Some(flag))
}

/// VF = 1 on carry out of bit 7
pub fn add(left: u8, right: u8) -> (u8, u8) {
    let (result, carry) = left.overflowing_add(right);
    (result, carry as u8)
}

/// VF = 0 on borrow, 1 otherwise; backwards from most CPUs
pub fn sub(left: u8, right: u8) -> (u8, u8) {
    let (result, borrow) = left.overflowing_sub(right);
    (result, !borrow as u8)
}

/// VF = the bit shifted out (LSB)
pub fn shr(value: u8) -> (u8, u8) {
    (value >> 1, value & 0x01)
}

/// VF = the bit shifted out (MSB), as 0 or 1
pub fn shl(value: u8) -> (u8, u8) {
    (value << 1, (value & 0x80) >> 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_carry() {
        assert_eq!(add(0xFF, 0x01), (0x00, 1));
        assert_eq!(add(0x01, 0x01), (0x02, 0));
        assert_eq!(add(0x80, 0x80), (0x00, 1));
    }

    #[test]
    fn test_sub_borrow_polarity() {
        assert_eq!(sub(0x05, 0x01), (0x04, 1));
        assert_eq!(sub(0x01, 0x05), (0xFC, 0));
        // equal operands don't borrow
        assert_eq!(sub(0x07, 0x07), (0x00, 1));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(shr(0b0000_0011), (0b0000_0001, 1));
        assert_eq!(shr(0b0000_0010), (0b0000_0001, 0));
        assert_eq!(shl(0b1000_0001), (0b0000_0010, 1));
        assert_eq!(shl(0b0100_0000), (0b1000_0000, 0));
    }

    #[test]
    fn test_apply_logic_leaves_flag() {
        assert_eq!(apply(AluMode::Load, 0x12, 0x34), (0x34, None));
        assert_eq!(apply(AluMode::Or, 0xF0, 0x0F), (0xFF, None));
        assert_eq!(apply(AluMode::And, 0xF0, 0x3C), (0x30, None));
        assert_eq!(apply(AluMode::Xor, 0xFF, 0x0F), (0xF0, None));
    }

    #[test]
    fn test_apply_subn_reverses_operands() {
        assert_eq!(apply(AluMode::SubN, 0x01, 0x05), (0x04, Some(1)));
        assert_eq!(apply(AluMode::SubN, 0x05, 0x01), (0xFC, Some(0)));
    }

    #[test]
    fn test_apply_shifts_ignore_vy() {
        assert_eq!(apply(AluMode::Shr, 0x03, 0xFF), (0x01, Some(1)));
        assert_eq!(apply(AluMode::Shl, 0x81, 0x00), (0x02, Some(1)));
    }
}
