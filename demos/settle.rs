//! # Network settling walkthrough
//!
//! Clamps the reference 4×4 puzzle, steps the network until it settles, and
//! prints the grid with each cell's confidence every few sweeps. Then releases
//! one clue and lets the grid settle again.
//!
//! Run with: `cargo run --example settle`

use settle_core::network::RelaxationNetwork;

// ── Display helpers ───────────────────────────────────────────────────────────

fn bar(v: f64) -> String {
    let filled = (v * 10.0).round() as usize;
    let empty = 10usize.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn print_grid(net: &RelaxationNetwork) {
    let n = net.size();
    for row in 0..n {
        let mut line = String::from("  ");
        for col in 0..n {
            let (value, p) = net.most_likely(row, col).unwrap_or((0, 0.0));
            let mark = if net.is_clamped(row, col) { '*' } else { ' ' };
            line.push_str(&format!("{}{} {} {:.2}   ", value, mark, bar(p), p));
        }
        println!("{}", line);
    }
}

fn settle(net: &mut RelaxationNetwork, every: u64) {
    loop {
        let r = net.step();
        if r.iteration % every == 0 || r.converged {
            println!("\n── sweep {:>3} │ max_change {:.5}", r.iteration, r.max_change);
            print_grid(net);
        }
        if r.converged || r.iteration >= 500 {
            break;
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<(), settle_core::SettleError> {
    println!("╔════════════════════════════════════════════════════╗");
    println!("║  Network settling — 4×4 Latin square, strength 0.5 ║");
    println!("╚════════════════════════════════════════════════════╝");

    let mut net = RelaxationNetwork::new(4)?;
    for (row, col, value) in [(0, 0, 1), (0, 1, 2), (1, 2, 4), (2, 3, 2), (3, 1, 3)] {
        net.set_clue(row, col, value)?;
    }
    println!("\nClues (marked *):");
    print_grid(&net);

    settle(&mut net, 10);
    println!(
        "\nSettled after {} sweeps — valid Latin square: {}",
        net.iteration(),
        net.is_valid_solution()
    );

    println!("\nReleasing clue at (0,1) and settling again …");
    net.remove_clue(0, 1)?;
    settle(&mut net, 20);
    println!(
        "\nSettled at sweep {} — valid Latin square: {}",
        net.iteration(),
        net.is_valid_solution()
    );

    Ok(())
}
