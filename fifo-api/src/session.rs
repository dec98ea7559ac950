//! Single game session with linear undo/redo history.
//!
//! Notation is the list of placed cells separated by spaces, e.g. `4 0 8`.
//! A game that started from an imported position is prefixed with
//! `FROM:<code>`.

use fifo_core::{Pos, Side, State, StateCode};

use crate::error::ApiError;

pub struct GameSession {
    /// History of positions (index 0 = starting position)
    states: Vec<State>,
    /// moves[i] led from states[i] to states[i + 1]
    moves: Vec<Pos>,
    /// Position currently shown
    current_index: usize,
    /// Starting code when not the empty board
    starting_code: Option<StateCode>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            states: vec![State::new()],
            moves: vec![],
            current_index: 0,
            starting_code: None,
        }
    }

    pub fn current(&self) -> &State {
        &self.states[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Moves played so far, including undone ones still available to redo.
    pub fn moves(&self) -> &[Pos] {
        &self.moves
    }

    /// Each move with the side that played it.
    pub fn history(&self) -> impl Iterator<Item = (Pos, Side)> + '_ {
        self.moves
            .iter()
            .zip(&self.states)
            .map(|(&pos, state)| (pos, state.side_to_move()))
    }

    pub fn reset(&mut self) {
        self.reset_to(State::new());
    }

    pub fn reset_to(&mut self, state: State) {
        let code = state.encode();
        self.starting_code = (code != StateCode::INITIAL).then_some(code);
        self.states = vec![state];
        self.moves = vec![];
        self.current_index = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index < self.states.len() - 1
    }

    /// Place a piece for the side to move, dropping any redo history.
    pub fn play(&mut self, pos: Pos) -> Result<(), ApiError> {
        let mut next = *self.current();
        next.play(pos)?;

        self.states.truncate(self.current_index + 1);
        self.moves.truncate(self.current_index);
        self.states.push(next);
        self.moves.push(pos);
        self.current_index += 1;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), ApiError> {
        if !self.can_undo() {
            return Err(ApiError::NothingToUndo);
        }
        self.current_index -= 1;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), ApiError> {
        if !self.can_redo() {
            return Err(ApiError::NothingToRedo);
        }
        self.current_index += 1;
        Ok(())
    }

    pub fn goto(&mut self, index: usize) -> Result<(), ApiError> {
        if index >= self.states.len() {
            return Err(ApiError::BadIndex(index));
        }
        self.current_index = index;
        Ok(())
    }

    pub fn export(&self) -> String {
        let moves: Vec<String> = self.moves.iter().map(|p| p.0.to_string()).collect();
        let moves = moves.join(" ");
        match self.starting_code {
            Some(code) if moves.is_empty() => format!("FROM:{}", code),
            Some(code) => format!("FROM:{} {}", code, moves),
            None => moves,
        }
    }

    /// Replace the session with the game described by `notation`.
    /// Replay stops early once a side has won.
    pub fn import(&mut self, notation: &str) -> Result<(), ApiError> {
        let mut tokens = notation.split_whitespace().peekable();

        let start = match tokens.peek().copied().and_then(|t| t.strip_prefix("FROM:")) {
            Some(code) => {
                let state = parse_code(code)?.decode()?;
                tokens.next();
                state
            }
            None => State::new(),
        };
        self.reset_to(start);

        for (i, token) in tokens.enumerate() {
            let bad = |reason: String| ApiError::BadNotation {
                index: i + 1,
                token: token.to_string(),
                reason,
            };
            let cell: i64 = token
                .parse()
                .map_err(|_| bad("not a cell index".to_string()))?;
            let pos = Pos::from_index(cell).map_err(|e| bad(e.to_string()))?;
            self.play(pos).map_err(|e| bad(e.to_string()))?;

            if self.current().winner().is_some() {
                break;
            }
        }
        Ok(())
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_code(text: &str) -> Result<StateCode, ApiError> {
    text.parse::<u32>()
        .map(StateCode)
        .map_err(|_| ApiError::BadNotation {
            index: 0,
            token: text.to_string(),
            reason: "not a state code".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_undo_redo() {
        let mut session = GameSession::new();
        session.play(Pos(4)).unwrap();
        session.play(Pos(0)).unwrap();
        assert_eq!(session.current_index(), 2);

        session.undo().unwrap();
        assert!(session.can_redo());
        session.redo().unwrap();
        assert!(!session.can_redo());
        assert!(matches!(session.redo(), Err(ApiError::NothingToRedo)));

        session.goto(0).unwrap();
        assert_eq!(session.current().encode(), StateCode::INITIAL);
        assert!(matches!(session.undo(), Err(ApiError::NothingToUndo)));
        assert!(matches!(session.goto(3), Err(ApiError::BadIndex(3))));
    }

    #[test]
    fn test_play_after_undo_drops_future() {
        let mut session = GameSession::new();
        session.play(Pos(4)).unwrap();
        session.play(Pos(0)).unwrap();
        session.undo().unwrap();
        session.play(Pos(8)).unwrap();
        assert_eq!(session.moves(), &[Pos(4), Pos(8)]);
        assert!(!session.can_redo());
        let history: Vec<(Pos, Side)> = session.history().collect();
        assert_eq!(history, vec![(Pos(4), Side::X), (Pos(8), Side::O)]);
    }

    #[test]
    fn test_occupied_cell_is_rejected() {
        let mut session = GameSession::new();
        session.play(Pos(4)).unwrap();
        assert!(matches!(
            session.play(Pos(4)),
            Err(ApiError::IllegalMove(_))
        ));
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_export_import() {
        let mut session = GameSession::new();
        for cell in [0, 3, 1, 4] {
            session.play(Pos(cell)).unwrap();
        }
        assert_eq!(session.export(), "0 3 1 4");

        let code = session.current().encode();
        let mut other = GameSession::new();
        other.import(&format!("FROM:{} 2", code)).unwrap();
        assert_eq!(other.export(), format!("FROM:{} 2", code));
        assert!(other.current().winner().is_some());

        let mut replayed = GameSession::new();
        replayed.import("0 3 1 4").unwrap();
        assert_eq!(replayed.current().encode(), code);
    }

    #[test]
    fn test_import_stops_at_win() {
        let mut session = GameSession::new();
        session.import("0 3 1 4 2 5 6").unwrap();
        assert_eq!(session.moves().len(), 5);
    }

    #[test]
    fn test_import_reports_bad_token() {
        let mut session = GameSession::new();
        let err = session.import("0 0").unwrap_err();
        assert!(matches!(err, ApiError::BadNotation { index: 2, .. }));
        assert!(session.import("FROM:2000000").is_err());
        assert!(session.import("x").is_err());
    }
}
