//! Line-oriented control protocol
//!
//! One command per input line, one response line per command. A command
//! is a two-letter prefix followed by whitespace-separated integer
//! arguments; `se`, `tl` and `tc` additionally carry a full position in
//! the wire format. Booleans are answered as `1`/`0`; a malformed
//! command is discarded and answered with `0`, leaving the engine and
//! subsequent commands unaffected.
//!
//! | prefix | meaning                      |
//! |--------|------------------------------|
//! | `in`   | init(nodes, moves, threads, seed reps) |
//! | `se`   | setup_evaluation(depth, position) |
//! | `e0`   | evaluate_start               |
//! | `e1`   | evaluate_stop                |
//! | `et`   | evaluate_time(ms)            |
//! | `tl`   | test legality(from, to, position) |
//! | `tc`   | test check(side, position)   |
//! | `gd`   | get output data              |
//! | `go`   | leave control mode           |
//! | `ex`   | exit                         |

use frontier_engine::{test_check, test_legality, Engine, Position};
use log::{debug, warn};

use crate::config::EngineConfig;

/// What the main loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// `go`: leave control mode. There is no interactive mode behind
    /// it, so callers exit.
    LeaveControl,
    /// `ex`: exit immediately.
    Exit,
}

/// Protocol state: the engine instance, if one has been initialized.
pub struct Driver {
    engine: Option<Engine>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver { engine: None }
    }

    /// Start with an engine pre-initialized from a configuration file.
    /// Falls back to an uninitialized driver when the parameters are
    /// rejected.
    pub fn with_config(config: &EngineConfig) -> Driver {
        match Engine::init(
            config.total_nodes,
            config.total_moves,
            config.thread_count,
            config.seed_reps,
        ) {
            Ok(engine) => {
                debug!("engine pre-initialized from config");
                Driver {
                    engine: Some(engine),
                }
            }
            Err(err) => {
                warn!("config-based init rejected: {err}");
                Driver { engine: None }
            }
        }
    }

    /// Handle one input line, producing the response line (possibly
    /// empty) and the control flow for the caller.
    pub fn handle_line(&mut self, line: &str) -> (String, Flow) {
        if line.len() < 2 || !line.is_char_boundary(2) {
            return (String::new(), Flow::Continue);
        }
        let prefix = &line[..2];
        let rest = &line[2..];

        match prefix {
            "go" => (String::new(), Flow::LeaveControl),
            "ex" => (String::new(), Flow::Exit),
            "in" => (bool_line(self.cmd_init(rest)), Flow::Continue),
            "se" => (bool_line(self.cmd_setup(rest)), Flow::Continue),
            "e0" => (
                bool_line(self.engine.as_ref().is_some_and(|e| e.evaluate_start())),
                Flow::Continue,
            ),
            "e1" => (
                bool_line(self.engine.as_ref().is_some_and(|e| e.evaluate_stop())),
                Flow::Continue,
            ),
            "et" => (bool_line(self.cmd_evaluate_time(rest)), Flow::Continue),
            "tl" => (bool_line(cmd_test_legality(rest)), Flow::Continue),
            "tc" => (bool_line(cmd_test_check(rest)), Flow::Continue),
            "gd" => (self.cmd_output(), Flow::Continue),
            _ => (String::new(), Flow::Continue),
        }
    }

    fn cmd_init(&mut self, args: &str) -> bool {
        let Some([nodes, moves, threads, seed_reps]) = ints::<4>(args) else {
            return false;
        };
        match Engine::init(nodes, moves, threads, seed_reps) {
            Ok(engine) => {
                // Re-init drops the previous instance, joining its workers.
                self.engine = Some(engine);
                true
            }
            Err(err) => {
                debug!("init rejected: {err}");
                false
            }
        }
    }

    fn cmd_setup(&mut self, args: &str) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let mut tokens = args.split_whitespace();
        let Some(depth) = tokens.next().and_then(|t| t.parse::<i64>().ok()) else {
            return false;
        };
        let position_text = tokens.collect::<Vec<_>>().join(" ");
        let Ok(position) = Position::parse(&position_text) else {
            return false;
        };
        engine.setup_evaluation(depth.max(0) as u32, &position);
        true
    }

    fn cmd_evaluate_time(&self, args: &str) -> bool {
        let Some([ms]) = ints::<1>(args) else {
            return false;
        };
        if ms < 0 {
            return false;
        }
        self.engine
            .as_ref()
            .is_some_and(|e| e.evaluate_time(ms as u64))
    }

    fn cmd_output(&self) -> String {
        let mut out = Vec::new();
        match &self.engine {
            None => out.push("0".to_string()),
            Some(engine) => {
                let report = engine.output();
                out.push(report.choices.len().to_string());
                for choice in &report.choices {
                    out.push(choice.from.to_string());
                    out.push(choice.to.to_string());
                    out.push(choice.eval_milli().to_string());
                    out.push(choice.text.clone());
                }
            }
        }
        let stats = match &self.engine {
            Some(engine) => engine.stats(),
            None => Default::default(),
        };
        for counter in [
            stats.nodes_added,
            stats.moves_added,
            stats.nodes_examined,
            stats.white_wins_found,
            stats.black_wins_found,
            stats.stalemates_found,
            stats.normals_found,
        ] {
            out.push(counter.to_string());
        }
        out.join(" ")
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

fn bool_line(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Parse exactly the first N whitespace-separated integers.
fn ints<const N: usize>(args: &str) -> Option<[i64; N]> {
    let mut out = [0i64; N];
    let mut tokens = args.split_whitespace();
    for slot in &mut out {
        *slot = tokens.next()?.parse().ok()?;
    }
    Some(out)
}

fn cmd_test_legality(args: &str) -> bool {
    let mut tokens = args.split_whitespace();
    let Some(from) = tokens.next().and_then(|t| t.parse::<i64>().ok()) else {
        return false;
    };
    let Some(to) = tokens.next().and_then(|t| t.parse::<i64>().ok()) else {
        return false;
    };
    if !(-128..=127).contains(&from) || !(-128..=127).contains(&to) {
        return false;
    }
    let position_text: String = tokens.collect::<Vec<_>>().join(" ");
    let Ok(position) = Position::parse(&position_text) else {
        return false;
    };
    test_legality(&position, from as i8, to as i8)
}

fn cmd_test_check(args: &str) -> bool {
    let mut tokens = args.split_whitespace();
    let Some(side) = tokens.next().and_then(|t| t.parse::<i64>().ok()) else {
        return false;
    };
    let position_text: String = tokens.collect::<Vec<_>>().join(" ");
    let Ok(position) = Position::parse(&position_text) else {
        return false;
    };
    test_check(&position, side != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "3 1 2 4 5 2 1 3 \
                            0 0 0 0 0 0 0 0 \
                            -1 -1 -1 -1 -1 -1 -1 -1 \
                            -1 -1 -1 -1 -1 -1 -1 -1 \
                            -1 -1 -1 -1 -1 -1 -1 -1 \
                            -1 -1 -1 -1 -1 -1 -1 -1 \
                            6 6 6 6 6 6 6 6 \
                            9 7 8 10 11 8 7 9 \
                            1 1 1 1 -1 0 4 60 -1 -1 0 0";

    #[test]
    fn test_init_validation() {
        let mut driver = Driver::new();
        assert_eq!(driver.handle_line("in 100000 1000000 2 50").0, "1");
        assert_eq!(driver.handle_line("in 10 1000000 2 50").0, "0", "too few nodes");
        assert_eq!(driver.handle_line("in 100000 1000000 1 50").0, "0", "too few threads");
        assert_eq!(driver.handle_line("in 100000 junk 2 50").0, "0", "parse failure");
    }

    #[test]
    fn test_commands_before_init_fail_cleanly() {
        let mut driver = Driver::new();
        assert_eq!(driver.handle_line(&format!("se 30 {STARTPOS}")).0, "0");
        assert_eq!(driver.handle_line("e0").0, "0");
        assert_eq!(driver.handle_line("e1").0, "0");
        assert_eq!(driver.handle_line("et 10").0, "0");
        assert_eq!(driver.handle_line("gd").0, "0 0 0 0 0 0 0 0");
    }

    #[test]
    fn test_flow_tokens() {
        let mut driver = Driver::new();
        assert_eq!(driver.handle_line("go").1, Flow::LeaveControl);
        assert_eq!(driver.handle_line("ex").1, Flow::Exit);
        assert_eq!(driver.handle_line("zz 1 2").1, Flow::Continue);
        assert_eq!(driver.handle_line("").1, Flow::Continue);
    }

    #[test]
    fn test_legality_and_check_are_stateless() {
        let mut driver = Driver::new();
        assert_eq!(driver.handle_line(&format!("tl 12 28 {STARTPOS}")).0, "1");
        assert_eq!(driver.handle_line(&format!("tl 12 29 {STARTPOS}")).0, "0");
        assert_eq!(driver.handle_line(&format!("tc 0 {STARTPOS}")).0, "0");
        assert_eq!(driver.handle_line("tl 12 28 1 2 3").0, "0", "truncated position");
    }

    #[test]
    fn test_full_session_over_the_wire() {
        let mut driver = Driver::new();
        assert_eq!(driver.handle_line("in 50000 500000 2 50").0, "1");
        assert_eq!(driver.handle_line(&format!("se 30 {STARTPOS}")).0, "1");
        assert_eq!(driver.handle_line("et 30").0, "1");

        let (line, flow) = driver.handle_line("gd");
        assert_eq!(flow, Flow::Continue);
        let fields: Vec<&str> = line.split_whitespace().collect();
        let choices: usize = fields[0].parse().expect("choice count");
        assert_eq!(choices, 20, "twenty choices from the starting position");
        // count + 4 fields per choice + 7 counters.
        assert_eq!(fields.len(), 1 + choices * 4 + 7);
        let nodes_added: u64 = fields[1 + choices * 4].parse().unwrap();
        assert!(nodes_added >= 21);
    }

    #[test]
    fn test_malformed_command_leaves_session_intact() {
        let mut driver = Driver::new();
        assert_eq!(driver.handle_line("in 50000 500000 2 10").0, "1");
        assert_eq!(driver.handle_line("se 30 not a position").0, "0");
        assert_eq!(driver.handle_line(&format!("se 30 {STARTPOS}")).0, "1");
        assert_eq!(driver.handle_line("et 10").0, "1");
    }
}
