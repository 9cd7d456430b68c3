use rummikub_cover::{CoveredTable, SolverConfig, TileBag, solve_with_config};

fn main() -> Result<(), rummikub_cover::InputError> {
    println!("Rummikub table extension\n");

    let table = TileBag::from_tokens(["1r", "2r", "3r", "4b", "4n", "4o", "j"])?;
    let hand = TileBag::from_tokens(["4r", "5b", "9n"])?;

    println!("Table: {} tiles, hand: {} tiles", table.total(), hand.total());
    for (tile, count) in table.iter() {
        println!("  {} x{}", tile, count);
    }
    if table.wild_count() > 0 {
        println!("  j x{}", table.wild_count());
    }

    for covered_table in [CoveredTable::SpareRow, CoveredTable::Accept] {
        let config = SolverConfig {
            covered_table,
            ..SolverConfig::default()
        };
        let solution = solve_with_config(&table, &hand, &config)?;

        println!("\n{:?}: explored {} nodes", covered_table, solution.nodes_visited);
        if solution.solvable {
            println!("Found {} sets:", solution.sets.len());
            for (i, meld) in solution.sets.iter().enumerate() {
                println!("  Set {}: {}", i + 1, meld);
            }
        } else {
            println!("No way to play.");
        }
    }

    Ok(())
}
