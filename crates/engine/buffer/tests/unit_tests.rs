//! Unit tests for the buffer engine components

mod codec_tests {
    use buffer::api;
    use rstest::rstest;

    #[rstest]
    #[case(0x0000)] // All zero
    #[case(0xFFFF)] // All ones
    #[case(0x1234)]
    fn test_u16_roundtrip(#[case] value: u16) {
        let mut buf = api::alloc(4).unwrap();
        buf.write_u16_be(value, 0).unwrap();
        buf.write_u16_le(value, 2).unwrap();
        assert_eq!(buf.read_u16_be(0).unwrap(), value);
        assert_eq!(buf.read_u16_le(2).unwrap(), value);
    }

    #[rstest]
    #[case(0)]
    #[case(u32::MAX)]
    #[case(0x1234_5678)]
    fn test_u32_roundtrip(#[case] value: u32) {
        let mut buf = api::alloc(8).unwrap();
        buf.write_u32_be(value, 0).unwrap();
        buf.write_u32_le(value, 4).unwrap();
        assert_eq!(buf.read_u32_be(0).unwrap(), value);
        assert_eq!(buf.read_u32_le(4).unwrap(), value);
    }

    #[rstest]
    #[case(i16::MIN as i64, 2)]
    #[case(i16::MAX as i64, 2)]
    #[case(i64::MIN, 8)]
    #[case(i64::MAX, 8)]
    #[case(-1, 8)]
    fn test_signed_boundaries(#[case] value: i64, #[case] width: usize) {
        let mut buf = api::alloc(8).unwrap();
        match width {
            2 => {
                let v = i16::try_from(value).unwrap();
                buf.write_i16_be(v, 0).unwrap();
                assert_eq!(buf.read_i16_be(0).unwrap(), v);
                buf.write_i16_le(v, 0).unwrap();
                assert_eq!(buf.read_i16_le(0).unwrap(), v);
            }
            _ => {
                buf.write_i64_be(value, 0).unwrap();
                assert_eq!(buf.read_i64_be(0).unwrap(), value);
                buf.write_i64_le(value, 0).unwrap();
                assert_eq!(buf.read_i64_le(0).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_byte_order_inversion() {
        let mut buf = api::alloc(4).unwrap();
        buf.write_u32_be(0x1234_5678, 0).unwrap();
        assert_eq!(buf.read_u32_le(0).unwrap(), 0x7856_3412);
    }

    #[rstest]
    #[case(1, 0xAB)]
    #[case(2, 0xABCD)]
    #[case(3, 0x00AB_CDEF)]
    #[case(4, 0xABCD_EF01)]
    #[case(5, 0x00AB_CDEF_0123)]
    #[case(6, 0xABCD_EF01_2345)]
    fn test_variable_width_roundtrip(#[case] width: usize, #[case] value: u64) {
        let mut buf = api::alloc(8).unwrap();
        buf.write_uint_be(value, 0, width).unwrap();
        assert_eq!(buf.read_uint_be(0, width).unwrap(), value);
        buf.write_uint_le(0, 0, width).unwrap();
        buf.write_uint_le(value, 0, width).unwrap();
        assert_eq!(buf.read_uint_le(0, width).unwrap(), value);
    }

    #[test]
    fn test_variable_width_sign_extension() {
        let mut buf = api::alloc(3).unwrap();
        buf.write_uint_be(0x0080_0000, 0, 3).unwrap();
        // The top bit of a 3-byte value is the sign bit
        assert_eq!(buf.read_int_be(0, 3).unwrap(), -8_388_608);
        assert_eq!(buf.read_uint_be(0, 3).unwrap(), 0x0080_0000);
    }

    #[test]
    fn test_variable_width_negative_roundtrip() {
        let mut buf = api::alloc(6).unwrap();
        for width in 1..=6 {
            buf.write_int_be(-1, 0, width).unwrap();
            assert_eq!(buf.read_int_be(0, width).unwrap(), -1);
            buf.write_int_le(-2, 0, width).unwrap();
            assert_eq!(buf.read_int_le(0, width).unwrap(), -2);
        }
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(100)]
    fn test_byte_length_bounds(#[case] width: usize) {
        let buf = api::alloc(16).unwrap();
        assert!(buf.read_uint_be(0, width).is_err());
        assert!(buf.read_int_le(0, width).is_err());
    }

    #[test]
    fn test_write_wraps_modulo_width() {
        let mut buf = api::alloc(2).unwrap();
        buf.write_uint_be(0x1_FFFE, 0, 2).unwrap();
        assert_eq!(buf.read_uint_be(0, 2).unwrap(), 0xFFFE);
    }

    #[test]
    fn test_out_of_bounds_never_partially_writes() {
        let mut buf = api::from_slice(&[0xAA; 4]).unwrap();
        assert!(buf.write_u32_be(0x1122_3344, 1).is_err());
        assert_eq!(buf.as_slice(), &[0xAA; 4], "failed write must not mutate");
    }

    #[test]
    fn test_write_returns_next_offset() {
        let mut buf = api::alloc(16).unwrap();
        let next = buf.write_u32_be(1, 0).unwrap();
        assert_eq!(next, 4);
        assert_eq!(buf.write_uint_le(1, next, 3).unwrap(), 7);
    }

    #[test]
    fn test_float_bit_patterns_survive() {
        let mut buf = api::alloc(8).unwrap();

        // A NaN with a nonstandard payload must round-trip bit-exactly
        let weird_nan = f64::from_bits(0x7FF8_0000_DEAD_BEEF);
        buf.write_f64_be(weird_nan, 0).unwrap();
        assert_eq!(buf.read_f64_be(0).unwrap().to_bits(), weird_nan.to_bits());

        buf.write_f64_le(-0.0, 0).unwrap();
        assert!(buf.read_f64_le(0).unwrap().is_sign_negative());

        buf.write_f32_be(f32::NEG_INFINITY, 0).unwrap();
        assert_eq!(buf.read_f32_be(0).unwrap(), f32::NEG_INFINITY);

        let subnormal = f32::from_bits(0x0000_0001);
        buf.write_f32_le(subnormal, 0).unwrap();
        assert_eq!(buf.read_f32_le(0).unwrap().to_bits(), 1);
    }
}

mod view_tests {
    use buffer::api;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subarray_aliases_parent() {
        let mut parent = api::from_slice(&[0, 1, 2, 3, 4]).unwrap();
        let mut child = parent.subarray(Some(1), Some(4));
        assert_eq!(child.as_slice(), &[1, 2, 3]);

        child.set(0, 0xEE);
        assert_eq!(parent.get(1), Some(0xEE), "child write visible in parent");

        parent.set(3, 0xDD);
        assert_eq!(child.get(2), Some(0xDD), "parent write visible in child");
    }

    #[test]
    fn test_from_buffer_copies() {
        let mut source = api::from_slice(&[1, 2, 3]).unwrap();
        let copy = api::from_buffer(&source).unwrap();
        source.set(0, 0xFF);
        assert_eq!(copy.as_slice(), &[1, 2, 3], "copies never alias");
    }

    #[test]
    fn test_subarray_negative_and_clamped_indices() {
        let buf = api::from_slice(&[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(buf.subarray(Some(-2), None).as_slice(), &[3, 4]);
        assert_eq!(buf.subarray(Some(1), Some(-1)).as_slice(), &[1, 2, 3]);
        assert_eq!(buf.subarray(Some(-100), Some(100)).as_slice(), buf.as_slice());
        // Reversed ranges are legal and empty
        assert!(buf.subarray(Some(4), Some(2)).is_empty());
        assert!(buf.slice(Some(3), Some(3)).is_empty());
    }

    #[test]
    fn test_indexed_access_sentinels() {
        let mut buf = api::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(buf.get(2), Some(3));
        assert_eq!(buf.get(3), None);
        buf.set(100, 0xFF); // Silently dropped
        assert_eq!(buf.as_slice(), &[1, 2, 3]);

        // The checked family raises instead
        assert!(buf.get_checked(3).is_err());
        assert!(buf.set_checked(3, 0).is_err());
        buf.set_checked(0, 9).unwrap();
        assert_eq!(buf.get_checked(0).unwrap(), 9);
    }

    #[test]
    fn test_fill_variants() {
        let mut buf = api::alloc(6).unwrap();
        buf.fill(&[0xAB], 0, 6).unwrap();
        assert_eq!(buf.as_slice(), &[0xAB; 6]);

        buf.fill(&[1, 2], 1, 5).unwrap();
        assert_eq!(buf.as_slice(), &[0xAB, 1, 2, 1, 2, 0xAB]);

        buf.fill(&[], 0, 6).unwrap(); // Empty pattern zero-fills
        assert_eq!(buf.as_slice(), &[0; 6]);

        assert!(buf.fill(&[1], 4, 2).is_err());
        assert!(buf.fill(&[1], 0, 7).is_err());
    }

    #[test]
    fn test_fill_str_repeats_pattern() {
        use common::Encoding;
        let mut buf = api::alloc(5).unwrap();
        buf.fill_str("ab", Encoding::Utf8, 0, 5).unwrap();
        assert_eq!(buf.as_slice(), b"ababa");
    }

    #[test]
    fn test_overlapping_copy_behaves_like_memmove() {
        let mut buf = api::from_slice(&[1, 2, 3, 4, 5]).unwrap();
        let sub = buf.subarray(Some(0), Some(3));
        let copied = sub.copy_to(&mut buf, 2, 0, 3).unwrap();
        assert_eq!(copied, 3);
        assert_eq!(buf.as_slice(), &[1, 2, 1, 2, 3]);
    }

    #[test]
    fn test_copy_truncates_to_target_space() {
        let src = api::from_slice(&[1, 2, 3, 4]).unwrap();
        let mut dst = api::alloc(3).unwrap();
        let copied = src.copy_to(&mut dst, 1, 0, 4).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(dst.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_copy_validates_before_mutating() {
        let src = api::from_slice(&[9, 9]).unwrap();
        let mut dst = api::from_slice(&[1, 2, 3]).unwrap();
        assert!(src.copy_to(&mut dst, 0, 1, 5).is_err());
        assert!(src.copy_to(&mut dst, 4, 0, 2).is_err());
        assert_eq!(dst.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_reverse_respects_subview_bounds() {
        let parent = api::from_slice(&[0, 1, 2, 3, 4]).unwrap();
        let mut child = parent.subarray(Some(1), Some(4));
        child.reverse();
        assert_eq!(parent.as_slice(), &[0, 3, 2, 1, 4]);
    }

    #[test]
    fn test_swaps() {
        let mut buf = api::from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        buf.swap16().unwrap();
        assert_eq!(buf.as_slice(), &[2, 1, 4, 3, 6, 5, 8, 7]);
        buf.swap32().unwrap();
        assert_eq!(buf.as_slice(), &[3, 4, 1, 2, 7, 8, 5, 6]);
        buf.swap64().unwrap();
        assert_eq!(buf.as_slice(), &[6, 5, 8, 7, 2, 1, 4, 3]);

        let mut odd = api::from_slice(&[1, 2, 3]).unwrap();
        assert!(odd.swap16().is_err());
        assert!(odd.swap32().is_err());
        assert!(odd.swap64().is_err());
    }

    #[test]
    fn test_equality_and_ordering() {
        let a = api::from_slice(&[1, 2, 3]).unwrap();
        let b = api::from_slice(&[1, 2, 3]).unwrap();
        let c = api::from_slice(&[1, 2, 4]).unwrap();
        assert!(a.equals(&b));
        assert_eq!(a, b);
        assert!(a < c);
        assert_eq!(api::compare(&a, &c), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_to_string_clamps_range() {
        use common::Encoding;
        let buf = api::from_slice(b"hello").unwrap();
        assert_eq!(buf.to_string(Encoding::Utf8, 0, 5).unwrap(), "hello");
        assert_eq!(buf.to_string(Encoding::Utf8, 1, 100).unwrap(), "ello");
        assert_eq!(buf.to_string(Encoding::Utf8, 4, 2).unwrap(), "");
    }

    #[test]
    fn test_write_str_truncates_at_char_boundary() {
        use common::Encoding;
        let mut buf = api::alloc(5).unwrap();
        // "héllo" is six bytes of UTF-8; the é must not be split
        let written = buf.write_str("héllo", Encoding::Utf8, 0).unwrap();
        assert_eq!(written, 5);
        assert_eq!(&buf.as_slice()[..written], "héll".as_bytes());

        let mut wide = api::alloc(5).unwrap();
        let written = wide.write_str("abc", Encoding::Utf16Le, 0).unwrap();
        assert_eq!(written, 4, "utf16le truncates to whole units");
    }

    #[test]
    fn test_wrap_aliases_supplied_bytes() {
        let mut buf = buffer::Buffer::wrap(vec![1, 2, 3]);
        buf.set(1, 9);
        assert_eq!(buf.as_slice(), &[1, 9, 3]);
        assert_eq!(buf.byte_offset(), 0);
    }

    #[test]
    fn test_independent_iterators() {
        let buf = api::from_slice(&[10, 20, 30]).unwrap();
        let mut first = buf.iter();
        let mut second = buf.iter();
        assert_eq!(first.next(), Some(10));
        assert_eq!(first.next(), Some(20));
        assert_eq!(second.next(), Some(10), "iterators must not share a cursor");
        let collected: Vec<u8> = (&buf).into_iter().collect();
        assert_eq!(collected, vec![10, 20, 30]);
    }
}

mod search_tests {
    use buffer::Needle;
    use buffer::api;
    use common::Encoding;

    #[test]
    fn test_index_of_byte_and_slice() {
        let buf = api::from_slice(b"this is a test").unwrap();
        assert_eq!(buf.index_of(b't', 0), Some(0));
        assert_eq!(buf.index_of(b't', 1), Some(10));
        assert_eq!(buf.index_of(&b"is"[..], 0), Some(2));
        assert_eq!(buf.index_of(&b"is"[..], 3), Some(5));
        assert_eq!(buf.index_of(&b"nope"[..], 0), None);
    }

    #[test]
    fn test_index_of_string_needle() {
        let buf = api::from_str("caf\u{00E9} bar", Encoding::Utf8).unwrap();
        assert_eq!(buf.index_of("caf\u{00E9}", 0), Some(0));
        assert_eq!(buf.index_of("bar", 0), Some(6));
        // A latin1-encoded needle matches latin1 bytes, not UTF-8 ones
        let latin = api::from_str("caf\u{00E9}", Encoding::Latin1).unwrap();
        assert_eq!(
            latin.index_of(Needle::Text("\u{00E9}", Encoding::Latin1), 0),
            Some(3)
        );
    }

    #[test]
    fn test_index_of_offset_clamping() {
        let buf = api::from_slice(b"abcabc").unwrap();
        assert_eq!(buf.index_of(b'c', -2), Some(5));
        assert_eq!(buf.index_of(b'a', -100), Some(0));
        assert_eq!(buf.index_of(b'a', 100), None);
        assert_eq!(buf.index_of(&b""[..], 100), Some(6), "empty needle clamps");
    }

    #[test]
    fn test_last_index_of() {
        let buf = api::from_slice(b"abcabc").unwrap();
        assert_eq!(buf.last_index_of(b'a', i64::MAX), Some(3));
        assert_eq!(buf.last_index_of(b'a', 2), Some(0));
        assert_eq!(buf.last_index_of(&b"bc"[..], i64::MAX), Some(4));
        assert_eq!(buf.last_index_of(&b"bc"[..], 3), Some(1));
        assert_eq!(buf.last_index_of(b'z', i64::MAX), None);
    }
}

mod coercion_tests {
    use buffer::api;
    use buffer::Endian;
    use common::{ErrorKind, Scalar};

    #[test]
    fn test_alloc_size_coercion() {
        assert_eq!(api::alloc("5").unwrap().len(), 5);
        assert_eq!(api::alloc(true).unwrap().len(), 1);
        assert_eq!(api::alloc("0x10").unwrap().len(), 16);
        assert_eq!(api::alloc(Scalar::Null).unwrap().len(), 0);
    }

    #[test]
    fn test_alloc_size_rejection() {
        assert_eq!(api::alloc(-1).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(api::alloc(1.5).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(api::alloc(f64::NAN).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(
            api::alloc(f64::INFINITY).unwrap_err().kind(),
            ErrorKind::Range
        );
        assert_eq!(
            api::alloc(Scalar::BigInt(5)).unwrap_err().kind(),
            ErrorKind::Type
        );
    }

    #[test]
    fn test_write_value_coercion() {
        let mut buf = api::alloc(4).unwrap();
        api::write_uint(&mut buf, "0x10", 0, 2, Endian::Big).unwrap();
        assert_eq!(buf.read_u16_be(0).unwrap(), 16);

        api::write_uint(&mut buf, "  26  ", 0, 2, Endian::Big).unwrap();
        assert_eq!(buf.read_u16_be(0).unwrap(), 26);

        // Negative values wrap modulo the width
        api::write_int(&mut buf, -1, 0, 2, Endian::Big).unwrap();
        assert_eq!(buf.read_u16_be(0).unwrap(), 0xFFFF);
        assert_eq!(api::read_int(&buf, 0, 2, Endian::Big).unwrap(), -1);
    }

    #[test]
    fn test_codec_offsets_are_strict() {
        let mut buf = api::alloc(8).unwrap();
        // Integral float offsets are fine
        api::write_uint(&mut buf, 7, 2.0, 2, Endian::Big).unwrap();
        assert_eq!(api::read_uint(&buf, 2.0, 2, Endian::Big).unwrap(), 7);
        // Fractional offsets are Range errors, wrong types are Type errors
        assert_eq!(
            api::read_uint(&buf, 1.5, 2, Endian::Big).unwrap_err().kind(),
            ErrorKind::Range
        );
        assert_eq!(
            api::read_uint(&buf, true, 2, Endian::Big).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            api::read_uint(&buf, "1", 2, Endian::Big).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            api::write_uint(&mut buf, 0, 7, 2, Endian::Big)
                .unwrap_err()
                .kind(),
            ErrorKind::Range
        );
    }
}

mod property_tests {
    use buffer::Endian;
    use buffer::api;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_u32_roundtrip(value in any::<u32>(), offset in 0usize..13) {
            let mut buf = api::alloc(16).unwrap();
            buf.write_u32_be(value, offset).unwrap();
            prop_assert_eq!(buf.read_u32_be(offset).unwrap(), value);
            buf.write_u32_le(value, offset).unwrap();
            prop_assert_eq!(buf.read_u32_le(offset).unwrap(), value);
        }

        #[test]
        fn prop_variable_width_roundtrip(value in any::<u64>(), width in 1usize..=6) {
            let mut buf = api::alloc(8).unwrap();
            let wrapped = value & ((1u64 << (8 * width)) - 1);
            buf.write_uint_be(value, 0, width).unwrap();
            prop_assert_eq!(buf.read_uint_be(0, width).unwrap(), wrapped);
            buf.write_uint_le(value, 0, width).unwrap();
            prop_assert_eq!(buf.read_uint_le(0, width).unwrap(), wrapped);
        }

        #[test]
        fn prop_signed_variable_roundtrip(value in any::<i32>(), width in 4usize..=6) {
            let mut buf = api::alloc(8).unwrap();
            buf.write_int_be(i64::from(value), 0, width).unwrap();
            prop_assert_eq!(buf.read_int_be(0, width).unwrap(), i64::from(value));
        }

        #[test]
        fn prop_f64_bit_exact(bits in any::<u64>()) {
            let mut buf = api::alloc(8).unwrap();
            let value = f64::from_bits(bits);
            buf.write_f64_be(value, 0).unwrap();
            prop_assert_eq!(buf.read_f64_be(0).unwrap().to_bits(), bits);
        }

        #[test]
        fn prop_coercing_write_matches_direct(value in any::<u16>(), offset in 0usize..7) {
            let mut direct = api::alloc(8).unwrap();
            let mut coerced = api::alloc(8).unwrap();
            direct.write_uint_be(u64::from(value), offset, 2).unwrap();
            api::write_uint(&mut coerced, value.to_string(), offset, 2, Endian::Big).unwrap();
            prop_assert_eq!(direct.as_slice(), coerced.as_slice());
        }
    }
}
