use okcash_pow::{boundary_from_difficulty, check_difficulty};

fn main() {
    let difficulty: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);
    let boundary = boundary_from_difficulty(difficulty);

    println!("Difficulty: {}", difficulty);
    println!("Boundary (hex): {}", hex::encode(boundary));

    println!("\nBoundary bytes:");
    for (i, &byte) in boundary.iter().enumerate() {
        if i % 8 == 0 {
            print!("\n{:02}: ", i);
        }
        print!("{:02x} ", byte);
    }
    println!("\n");

    // boundary = 2^256 / difficulty, so a hash passes with probability ~1/difficulty
    let leading_zero_bits: u32 = boundary
        .iter()
        .take_while(|&&b| b == 0)
        .count() as u32
        * 8
        + boundary.iter().find(|&&b| b != 0).map_or(0, |b| b.leading_zeros());
    println!("Leading zero bits: {}", leading_zero_bits);

    let mut just_below = boundary;
    if let Some(last) = just_below.iter_mut().rev().find(|b| **b != 0) {
        *last -= 1;
    }
    println!("boundary passes:      {}", check_difficulty(&boundary, &boundary));
    println!("smaller hash passes:  {}", check_difficulty(&just_below, &boundary));
    println!("all-ones hash passes: {}", check_difficulty(&[0xFF; 32], &boundary));
}
