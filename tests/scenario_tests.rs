//! Reference scenario and codec-wide properties.

use carrier_stego::codec::{fixed_rate_capacity, Codec, LsbCodec, RangeTable, VdCodec};
use carrier_stego::{Carrier, Error, Framing, SampleBuffer, Seed, Shape};

const SCENARIO: [u8; 8] = [10, 12, 50, 52, 200, 202, 0, 255];
const PAYLOAD: u8 = 0b1011_0010;

fn scenario() -> SampleBuffer<u8> {
    SampleBuffer::from_flat(SCENARIO.to_vec())
}

/// Deterministic pseudo-random bytes.
fn noise(len: usize, mut state: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

#[test]
fn test_scenario_lsb_seeded() {
    let codec = LsbCodec::new(1)
        .unwrap()
        .with_seed(Some(Seed::Number(42)))
        .with_framing(Framing::Raw);
    let stego = codec.embed(&scenario(), &[PAYLOAD]).unwrap();
    assert_eq!(codec.extract(&stego).unwrap(), vec![PAYLOAD]);

    for (before, after) in SCENARIO.iter().zip(stego.as_slice()) {
        assert!(before.abs_diff(*after) <= 1);
    }
}

#[test]
fn test_scenario_needs_raw_framing() {
    // 8 elements cannot hold a 32-bit header plus a byte.
    let err = LsbCodec::new(1)
        .unwrap()
        .with_seed(Some(Seed::Number(42)))
        .embed(&scenario(), &[PAYLOAD])
        .unwrap_err();
    assert!(matches!(err, Error::Capacity { needed: 40, available: 8 }));
}

#[test]
fn test_scenario_vd_natural_order() {
    let codec = VdCodec::new().with_framing(Framing::Raw);
    let capacity = codec.capacity(&scenario()).unwrap();
    assert_eq!(capacity.total_bits, 9);
    assert_eq!(capacity.skipped_units, 1);

    let stego = codec.embed(&scenario(), &[PAYLOAD]).unwrap();
    assert_eq!(stego.as_slice()[6..], [0, 255]);
    assert_eq!(codec.extract(&stego).unwrap(), vec![PAYLOAD]);
}

#[test]
fn test_scenario_vd_seeded() {
    let codec = VdCodec::new()
        .with_seed(Some(Seed::Number(42)))
        .with_framing(Framing::Raw);
    let capacity = codec.capacity(&scenario()).unwrap();
    assert_eq!(capacity.total_bits, 9);
    assert_eq!(capacity.units, 3);
    assert_eq!(capacity.skipped_units, 1);

    let stego = codec.embed(&scenario(), &[PAYLOAD]).unwrap();
    assert_eq!(codec.extract(&stego).unwrap(), vec![PAYLOAD]);
    assert_eq!(stego.as_slice()[6..], [0, 255]);

    // Each pair keeps its midpoint, so values stay near the cover.
    for (pair, cover) in stego.as_slice().chunks(2).zip(SCENARIO.chunks(2)) {
        let before = (u32::from(cover[0]) + u32::from(cover[1])) / 2;
        let after = (u32::from(pair[0]) + u32::from(pair[1])) / 2;
        assert_eq!(before, after);
    }
}

#[test]
fn test_round_trip_many_payloads() {
    let cover = SampleBuffer::from_flat(noise(6000, 0x1234_5678));
    for (n, len) in [0usize, 1, 2, 17, 100, 250].into_iter().enumerate() {
        let payload = noise(len, 7 + n as u32);
        let seed = Some(Seed::Number(n as u64));
        let lsb = LsbCodec::new(1 + (n % 4) as u8).unwrap().with_seed(seed.clone());
        let vd = VdCodec::new().with_seed(seed);

        let stego = lsb.embed(&cover, &payload).unwrap();
        assert_eq!(lsb.extract(&stego).unwrap(), payload);
        let stego = vd.embed(&cover, &payload).unwrap();
        assert_eq!(vd.extract(&stego).unwrap(), payload);
    }
}

#[test]
fn test_lsb_capacity_depends_on_shape_only() {
    let shape = Shape::new(vec![16, 16], 3).unwrap();
    let a = SampleBuffer::new(vec![0u8; 768], shape.clone()).unwrap();
    let b = SampleBuffer::new(noise(768, 99), shape.clone()).unwrap();
    let codec = LsbCodec::new(2).unwrap();

    assert_eq!(codec.capacity(&a).unwrap(), codec.capacity(&b).unwrap());
    assert_eq!(codec.capacity(&a).unwrap().total_bits, fixed_rate_capacity(&shape, 2));
}

#[test]
fn test_capacity_monotonic_in_size() {
    let codec = LsbCodec::default();
    let mut previous = 0;
    for len in [0, 10, 100, 1000] {
        let bits = codec.capacity(&SampleBuffer::from_flat(vec![9u8; len])).unwrap().total_bits;
        assert!(bits >= previous);
        previous = bits;
    }
}

#[test]
fn test_embedding_is_deterministic() {
    let cover = SampleBuffer::from_flat(noise(2048, 5));
    for seed in [None, Some(Seed::from("same"))] {
        let lsb = LsbCodec::new(2).unwrap().with_seed(seed.clone());
        assert_eq!(
            lsb.embed(&cover, b"repeatable").unwrap(),
            lsb.embed(&cover, b"repeatable").unwrap()
        );
        let vd = VdCodec::new().with_seed(seed);
        assert_eq!(
            vd.embed(&cover, b"repeatable").unwrap(),
            vd.embed(&cover, b"repeatable").unwrap()
        );
    }
}

#[test]
fn test_vd_overflow_safety_on_extremes() {
    // Mostly saturated values with a few mid-tones.
    let data: Vec<u8> = noise(4096, 31)
        .into_iter()
        .map(|v| match v % 4 {
            0 => 0,
            1 => 255,
            _ => v,
        })
        .collect();
    let cover = SampleBuffer::from_flat(data);

    for f in 1..=4 {
        let codec = VdCodec::new()
            .with_first_range_bits(f)
            .unwrap()
            .with_seed(Some(Seed::Number(f as u64)));
        let room = codec.max_payload_bytes(&cover).unwrap().min(200);
        let payload = noise(room, 3);
        let stego = codec.embed(&cover, &payload).unwrap();
        assert_eq!(codec.extract(&stego).unwrap(), payload);
    }
}

#[test]
fn test_vd_capacity_below_full_rate() {
    let cover = SampleBuffer::from_flat(noise(4000, 11));
    let codec = VdCodec::new();
    let table = RangeTable::for_bit_depth(8, 3).unwrap();
    let lsb_at_max = fixed_rate_capacity(cover.shape(), table.max_bits() as u8);
    assert!(codec.max_capacity(&cover).unwrap() <= lsb_at_max / 2);
}
