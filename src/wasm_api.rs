use crate::json::solve_json;
use crate::solver::{CoveredTable, SolverConfig};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main WASM API: decide whether the hand can extend the table
///
/// # Arguments
/// * `table_tiles` - JSON array of tile strings on the table (e.g., ["1r", "2r", "3r"])
/// * `hand_tiles` - JSON array of tile strings in the hand (e.g., ["4r", "j"])
/// * `time_limit_ms` - Maximum time to search in milliseconds, 0 for no limit
/// * `accept_exact_cover` - Report a table rebuilt without hand tiles as playable
///
/// # Returns
/// JSON string with SolverResult containing the verdict, the chosen sets, or an error
#[wasm_bindgen]
pub fn solve_rummikub(
    table_tiles: &str,
    hand_tiles: &str,
    time_limit_ms: u64,
    accept_exact_cover: bool,
) -> String {
    let config = SolverConfig {
        time_limit_ms: (time_limit_ms > 0).then_some(time_limit_ms),
        covered_table: if accept_exact_cover {
            CoveredTable::Accept
        } else {
            CoveredTable::SpareRow
        },
    };
    solve_json(table_tiles, hand_tiles, &config).to_json()
}

/// Get the git commit hash that this WASM module was built from
///
/// Returns the first 8 characters of the commit hash, or "unknown" if not available
#[wasm_bindgen]
pub fn get_build_commit() -> String {
    env!("BUILD_COMMIT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn test_solve_rummikub_reports_sets() {
        let out = solve_rummikub(r#"["1r","2r","3r"]"#, r#"["4r"]"#, 0, false);
        assert!(out.contains(r#""playable":true"#));
        assert!(out.contains(r#""4r""#));
    }

    #[wasm_bindgen_test]
    fn test_build_commit_is_set() {
        assert!(!get_build_commit().is_empty());
    }
}
