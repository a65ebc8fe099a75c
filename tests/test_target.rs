use okcash_pow::{boundary_from_difficulty, check_difficulty, quick_check_difficulty, Light};

#[test]
fn test_difficulty_5_boundary() {
    let boundary = boundary_from_difficulty(5);
    println!("Boundary: {}", hex::encode(boundary));

    // 2^256 / 5 = 0x3333...33
    assert!(boundary.iter().all(|&b| b == 0x33));
}

#[test]
fn test_boundary_is_inclusive() {
    let boundary = boundary_from_difficulty(1_000_000);
    assert!(check_difficulty(&boundary, &boundary));

    let mut above = boundary;
    for byte in above.iter_mut().rev() {
        let (next, carry) = byte.overflowing_add(1);
        *byte = next;
        if !carry {
            break;
        }
    }
    assert!(!check_difficulty(&above, &boundary));
}

#[test]
fn test_higher_difficulty_lowers_boundary() {
    let easy = boundary_from_difficulty(1_000);
    let hard = boundary_from_difficulty(1_000_000);
    assert!(hard < easy);
    assert!(check_difficulty(&hard, &easy));
    assert!(!check_difficulty(&easy, &hard));
}

#[test]
fn test_quick_check_agrees_with_light() {
    let light = Light::with_seed(1024, &[0u8; 32]).unwrap();
    let header = [0x11u8; 32];
    let boundary = boundary_from_difficulty(4);

    for nonce in 0..32u64 {
        let out = light.compute_with_size(32 * 1024, &header, nonce).unwrap();
        assert_eq!(
            quick_check_difficulty(&header, nonce, &out.mix_hash, &boundary),
            check_difficulty(&out.result, &boundary),
            "nonce {}",
            nonce
        );
    }
}
