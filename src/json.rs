//! JSON form of a solver verdict, shared by the CLI and the WASM API.

use crate::solver::{Solution, SolverConfig, solve_with_config};
use crate::{Meld, MeldType, TileBag};
use serde::{Deserialize, Serialize};

/// JSON-serializable representation of a meld
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MeldJson {
    #[serde(rename = "group")]
    Group { tiles: Vec<String> },
    #[serde(rename = "run")]
    Run { tiles: Vec<String> },
}

impl From<&Meld> for MeldJson {
    fn from(meld: &Meld) -> Self {
        let tiles: Vec<String> = meld.tiles.iter().map(|t| t.to_string()).collect();
        match meld.meld_type {
            MeldType::Group => MeldJson::Group { tiles },
            MeldType::Run => MeldJson::Run { tiles },
        }
    }
}

/// Result of the solver operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverResult {
    /// False only when the input could not be used
    pub success: bool,
    /// Whether the player can play
    pub playable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<Vec<MeldJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the search completed fully (true) or timed out (false)
    pub search_completed: bool,
    pub depth_reached: usize,
    pub nodes_visited: u64,
}

impl SolverResult {
    pub fn failure(error: impl Into<String>) -> Self {
        SolverResult {
            success: false,
            playable: false,
            sets: None,
            error: Some(error.into()),
            search_completed: false,
            depth_reached: 0,
            nodes_visited: 0,
        }
    }

    /// Serialize, falling back to a hand-written error object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e)
        })
    }
}

impl From<&Solution> for SolverResult {
    fn from(solution: &Solution) -> Self {
        SolverResult {
            success: true,
            playable: solution.solvable,
            sets: solution
                .solvable
                .then(|| solution.sets.iter().map(MeldJson::from).collect()),
            error: if solution.search_completed {
                None
            } else {
                Some("No solution found within time limit".to_string())
            },
            search_completed: solution.search_completed,
            depth_reached: solution.depth_reached,
            nodes_visited: solution.nodes_visited,
        }
    }
}

/// Solve from two JSON arrays of tile strings (e.g. `["1r", "2r", "j"]`).
pub fn solve_json(table_tiles: &str, hand_tiles: &str, config: &SolverConfig) -> SolverResult {
    match solve_json_internal(table_tiles, hand_tiles, config) {
        Ok(result) => result,
        Err(e) => SolverResult::failure(e),
    }
}

fn solve_json_internal(
    table_tiles: &str,
    hand_tiles: &str,
    config: &SolverConfig,
) -> Result<SolverResult, String> {
    let table_strs: Vec<String> =
        serde_json::from_str(table_tiles).map_err(|e| format!("Invalid table JSON: {}", e))?;
    let hand_strs: Vec<String> =
        serde_json::from_str(hand_tiles).map_err(|e| format!("Invalid hand JSON: {}", e))?;

    let table = TileBag::from_tokens(&table_strs).map_err(|e| e.to_string())?;
    let hand = TileBag::from_tokens(&hand_strs).map_err(|e| e.to_string())?;

    let solution = solve_with_config(&table, &hand, config).map_err(|e| e.to_string())?;
    Ok(SolverResult::from(&solution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::CoveredTable;

    #[test]
    fn test_solve_json_playable() {
        let result = solve_json(r#"["1r","2r","3r"]"#, r#"["4r"]"#, &SolverConfig::default());
        assert!(result.success);
        assert!(result.playable);
        assert!(result.search_completed);
        assert_eq!(
            result.sets,
            Some(vec![MeldJson::Run {
                tiles: vec!["1r".into(), "2r".into(), "3r".into(), "4r".into()]
            }])
        );

        let json: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(json["sets"][0]["type"], "run");
        assert_eq!(json["sets"][0]["tiles"][3], "4r");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_solve_json_not_playable() {
        let result = solve_json(r#"["1r","2r","4r"]"#, "[]", &SolverConfig::default());
        assert!(result.success);
        assert!(!result.playable);
        assert_eq!(result.sets, None);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_solve_json_group_with_wildcard_identity() {
        let config = SolverConfig {
            covered_table: CoveredTable::SpareRow,
            time_limit_ms: Some(10_000),
        };
        let result = solve_json(r#"["4b","4n","4r"]"#, r#"["j"]"#, &config);
        assert_eq!(
            result.sets,
            Some(vec![MeldJson::Group {
                tiles: vec!["4b".into(), "4n".into(), "4r".into(), "ja".into()]
            }])
        );
    }

    #[test]
    fn test_solve_json_errors() {
        let bad_json = solve_json("not json", "[]", &SolverConfig::default());
        assert!(!bad_json.success);
        assert!(bad_json.error.unwrap().starts_with("Invalid table JSON"));

        let bad_tile = solve_json(r#"["14r"]"#, "[]", &SolverConfig::default());
        assert!(!bad_tile.success);
        assert!(bad_tile.error.unwrap().contains("14r"));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{"covered_table":"accept"}"#).unwrap();
        assert_eq!(config.covered_table, CoveredTable::Accept);
        assert_eq!(config.time_limit_ms, None);
    }
}
