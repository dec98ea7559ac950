//! Console play against the score table.
//!
//! The bot plays one side. On the human's turn a cell index places a piece,
//! an empty line lets the table pick, and a negative number `-k` steps `k`
//! plies back through the history.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use fifo_core::{Pos, Side, State, StateCode};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Score of `code` in the table; unknown states count as draws.
fn score_of(scores: &BTreeMap<StateCode, f64>, code: StateCode) -> f64 {
    scores.get(&code).copied().unwrap_or(0.0)
}

/// Pick the best option for `side`: the highest score for X, the lowest for
/// O. Ties are broken uniformly at random.
pub fn pick_best_move<R: Rng + ?Sized>(
    side: Side,
    options: &[(f64, Pos)],
    rng: &mut R,
) -> Option<Pos> {
    let best = options
        .iter()
        .map(|&(score, _)| score)
        .reduce(|a, b| match side {
            Side::X => a.max(b),
            Side::O => a.min(b),
        })?;

    let ties: Vec<Pos> = options
        .iter()
        .filter(|&&(score, _)| score == best)
        .map(|&(_, pos)| pos)
        .collect();
    ties.choose(rng).copied()
}

/// Scored options of `state` in ascending cell order.
pub fn options(scores: &BTreeMap<StateCode, f64>, state: &State) -> Vec<(f64, Pos)> {
    state
        .legal_moves()
        .into_iter()
        .map(|(code, pos)| (score_of(scores, code), pos))
        .collect()
}

/// Interactive game loop.
pub struct PlayLoop<'a, R: Rng> {
    scores: &'a BTreeMap<StateCode, f64>,
    bot: Side,
    rng: R,
}

impl<'a, R: Rng> PlayLoop<'a, R> {
    pub fn new(scores: &'a BTreeMap<StateCode, f64>, bot: Side, rng: R) -> Self {
        Self { scores, bot, rng }
    }

    /// Play until a side wins or the input runs out.
    /// Returns the winner, or None if the input ended first.
    pub fn run<I: BufRead, W: Write>(
        &mut self,
        mut input: I,
        out: &mut W,
    ) -> io::Result<Option<Side>> {
        let mut state = State::new();
        let mut history: Vec<StateCode> = Vec::new();

        while state.winner().is_none() {
            let options = options(self.scores, &state);
            let listed: Vec<(f64, u8)> = options.iter().map(|&(s, p)| (s, p.0)).collect();
            writeln!(out, "State={}, options={:?}", state.encode(), listed)?;

            let side = state.side_to_move();
            let choice: i64 = if side == self.bot {
                let Some(pos) = pick_best_move(side, &options, &mut self.rng) else {
                    break;
                };
                writeln!(out, "Bot selected {}", pos.0)?;
                pos.0 as i64
            } else {
                write!(out, "{}: ", side)?;
                out.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                let line = line.trim();
                if line.is_empty() {
                    let Some(pos) = pick_best_move(side, &options, &mut self.rng) else {
                        break;
                    };
                    writeln!(out, "Automatically selected {}", pos.0)?;
                    pos.0 as i64
                } else {
                    match line.parse::<i64>() {
                        Ok(i) => i,
                        Err(_) => {
                            writeln!(out, "not a cell index: {:?}", line)?;
                            continue;
                        }
                    }
                }
            };

            if choice < 0 {
                let mut steps = choice;
                while steps < 0 {
                    let Some(code) = history.pop() else { break };
                    state = code
                        .decode()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    steps += 1;
                }
            } else {
                let before = state.encode();
                match Pos::from_index(choice).and_then(|pos| state.play(pos)) {
                    Ok(_) => history.push(before),
                    Err(e) => {
                        writeln!(out, "{}", e)?;
                        continue;
                    }
                }
            }

            writeln!(out, "{}", state)?;
        }

        let winner = state.winner();
        if let Some(side) = winner {
            writeln!(out, "{} won!", side)?;
        }
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn played(cells: &[u8]) -> State {
        let mut state = State::new();
        for &c in cells {
            state.play(Pos(c)).unwrap();
        }
        state
    }

    fn run(scores: &BTreeMap<StateCode, f64>, bot: Side, input: &str) -> (Option<Side>, String) {
        let mut out = Vec::new();
        let mut game = PlayLoop::new(scores, bot, StdRng::seed_from_u64(7));
        let winner = game.run(input.as_bytes(), &mut out).unwrap();
        (winner, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_pick_best_move_by_side() {
        let mut rng = StdRng::seed_from_u64(1);
        let options = [(0.0, Pos(0)), (0.5, Pos(1)), (-0.25, Pos(2))];
        assert_eq!(pick_best_move(Side::X, &options, &mut rng), Some(Pos(1)));
        assert_eq!(pick_best_move(Side::O, &options, &mut rng), Some(Pos(2)));
        assert_eq!(pick_best_move(Side::X, &[], &mut rng), None);
    }

    #[test]
    fn test_pick_best_move_breaks_ties_among_best() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = [(0.5, Pos(0)), (0.25, Pos(1)), (0.5, Pos(2))];
        for _ in 0..50 {
            let pos = pick_best_move(Side::X, &options, &mut rng).unwrap();
            assert!(pos == Pos(0) || pos == Pos(2));
        }
    }

    #[test]
    fn test_game_until_win() {
        // Steer the bot (O) onto 3 and then 4 while X completes the top row.
        let scores = BTreeMap::from([
            (played(&[0, 3]).encode(), -1.0),
            (played(&[0, 3, 1, 4]).encode(), -1.0),
        ]);
        let (winner, out) = run(&scores, Side::O, "0\n1\n2\n");
        assert_eq!(winner, Some(Side::X));
        assert!(out.contains("Bot selected 3"));
        assert!(out.contains("Bot selected 4"));
        assert!(out.ends_with("x won!\n"));
    }

    #[test]
    fn test_undo_steps_back_through_history() {
        let scores = BTreeMap::new();
        // X plays, the bot answers, then both plies are taken back.
        let (winner, out) = run(&scores, Side::O, "4\n-2\n");
        assert_eq!(winner, None);
        assert_eq!(out.matches("State=1000000,").count(), 2);
    }

    #[test]
    fn test_bad_input_reprompts() {
        let scores = BTreeMap::new();
        let (winner, out) = run(&scores, Side::O, "9\nabc\n");
        assert_eq!(winner, None);
        assert!(out.contains("outside 0..=8"));
        assert!(out.contains("not a cell index"));
        assert!(!out.contains("Bot selected"));
    }

    #[test]
    fn test_empty_line_auto_selects() {
        let scores = BTreeMap::from([(played(&[8]).encode(), 1.0)]);
        let (_, out) = run(&scores, Side::O, "\n");
        assert!(out.contains("Automatically selected 8"));
    }
}
