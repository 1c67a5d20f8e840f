//! Tests for the GF(2^128) multiplication table

#[cfg(test)]
mod tests {
    use super::super::table::Gf128Table;
    use crate::block::Block;
    use subtle::ConstantTimeEq;

    /// Bit-at-a-time multiplication straight from SP 800-38D Algorithm 1
    fn reference_mul(x: &Block, y: &Block) -> Block {
        let x = u128::from_be_bytes(*x);
        let mut v = u128::from_be_bytes(*y);
        let mut z = 0u128;
        for i in 0..128 {
            if (x >> (127 - i)) & 1 == 1 {
                z ^= v;
            }
            let carry = v & 1;
            v >>= 1;
            if carry == 1 {
                v ^= 0xe1u128 << 120;
            }
        }
        z.to_be_bytes()
    }

    fn block(hex: &str) -> Block {
        let mut out = [0u8; 16];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).unwrap();
        }
        out
    }

    /// H for the all-zero AES-128 key
    const H_ZERO_KEY: &str = "66e94bd4ef8a2c3b884cfa59ca342b2e";

    #[test]
    fn test_multiply_by_one_is_identity() {
        let h = block(H_ZERO_KEY);
        let table = Gf128Table::new(&h);
        let mut one = [0u8; 16];
        one[0] = 0x80;
        assert_eq!(table.multiply_h(&one), h);
        assert_eq!(table.subkey(), h);
    }

    #[test]
    fn test_multiply_zero() {
        let table = Gf128Table::new(&block(H_ZERO_KEY));
        assert_eq!(table.multiply_h(&[0u8; 16]), [0u8; 16]);

        let zero_table = Gf128Table::new(&[0u8; 16]);
        assert_eq!(zero_table.multiply_h(&[0xffu8; 16]), [0u8; 16]);
    }

    #[test]
    fn test_known_product() {
        // X1 of McGrew-Viega test case 2: C1·H with the zero-key subkey
        let table = Gf128Table::new(&block(H_ZERO_KEY));
        let c1 = block("0388dace60b6a392f328c2b971b2fe78");
        assert_eq!(
            table.multiply_h(&c1),
            block("5e2ec746917062882c85b0685353deb7")
        );
    }

    #[test]
    fn test_matches_reference_multiplication() {
        let subkeys = [
            block(H_ZERO_KEY),
            block("b83b533708bf535d0aa6e52980d53b78"),
            [0xffu8; 16],
            block("00000000000000000000000000000001"),
        ];
        let inputs = [
            block("0388dace60b6a392f328c2b971b2fe78"),
            block("80000000000000000000000000000000"),
            block("00000000000000000000000000000001"),
            block("fedcba9876543210fedcba9876543210"),
            [0xffu8; 16],
        ];
        for h in &subkeys {
            let table = Gf128Table::new(h);
            for x in &inputs {
                assert_eq!(table.multiply_h(x), reference_mul(x, h));
            }
        }
    }

    #[test]
    fn test_distributes_over_xor() {
        let table = Gf128Table::new(&block("b83b533708bf535d0aa6e52980d53b78"));
        let a = block("0123456789abcdef0123456789abcdef");
        let b = block("deadbeefcafebabe0011223344556677");
        let mut sum = a;
        for (s, y) in sum.iter_mut().zip(b.iter()) {
            *s ^= y;
        }
        let mut expected = table.multiply_h(&a);
        for (e, y) in expected.iter_mut().zip(table.multiply_h(&b).iter()) {
            *e ^= y;
        }
        assert_eq!(table.multiply_h(&sum), expected);
    }

    #[test]
    fn test_table_construction_is_idempotent() {
        let h = block("b83b533708bf535d0aa6e52980d53b78");
        let first = Gf128Table::new(&h);
        let second = Gf128Table::new(&h);
        assert!(bool::from(first.ct_eq(&second)));

        let other = Gf128Table::new(&block(H_ZERO_KEY));
        assert!(!bool::from(first.ct_eq(&other)));
    }

    #[test]
    fn test_multiply_is_pure() {
        let table = Gf128Table::new(&block(H_ZERO_KEY));
        let x = block("fedcba9876543210fedcba9876543210");
        let first = table.multiply_h(&x);
        let second = table.multiply_h(&x);
        assert_eq!(first, second);
    }

    #[test]
    fn test_debug_redacts_entries() {
        let table = Gf128Table::new(&block(H_ZERO_KEY));
        let rendered = format!("{:?}", table);
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("66e9"));
    }
}
