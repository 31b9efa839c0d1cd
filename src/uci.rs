use std::io::{self, BufRead, Write};

use anyhow::Result;
use log::{debug, error, info, warn};

use crate::board::{Board, Color};
use crate::error::{ChessError, ChessResult};
use crate::notation::apply_move_notation;
use crate::search::Search;

pub const ENGINE_NAME: &str = "minimax-chess";
pub const ENGINE_AUTHOR: &str = "the minimax-chess developers";

/// Search depth used when neither the command line nor `go` sets one.
pub const DEFAULT_DEPTH: u32 = 4;

/// One UCI session: the current position plus search settings.
pub struct UciHandler {
    board: Board,
    search: Search,
    depth: u32,
}

impl Default for UciHandler {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl UciHandler {
    pub fn new(depth: u32) -> Self {
        UciHandler {
            board: Board::new(),
            search: Search::new(),
            depth: depth.max(1),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Runs the command loop on stdin/stdout until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    pub fn run_with<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<()> {
        let mut line = String::new();

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();

            if command == "quit" {
                break;
            }
            match self.handle_command(command) {
                Ok(response) => write!(writer, "{}", response)?,
                Err(err) => error!("`{}` failed: {:#}", command, err),
            }

            writer.flush()?;
            line.clear();
        }
        info!("session ended");
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match parts[0] {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => Ok(self.handle_ucinewgame()),
            "position" => {
                if let Err(err) = self.handle_position(&parts[1..]) {
                    warn!("ignoring `{}`: {}", command, err);
                }
                Ok("".to_string())
            }
            "go" => self.handle_go(&parts[1..]),
            "d" => Ok(format!("{}Fen: {}\n", self.board, self.board.to_fen())),
            "quit" => Ok("".to_string()),
            _ => {
                debug!("unknown command `{}`", command);
                Ok("".to_string())
            }
        }
    }

    fn handle_uci(&self) -> String {
        format!("id name {}\nid author {}\nuciok\n", ENGINE_NAME, ENGINE_AUTHOR)
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.board = Board::new();
        "".to_string()
    }

    /// Builds the new position aside and only installs it once every move applied.
    fn handle_position(&mut self, parts: &[&str]) -> ChessResult<()> {
        let moves_at = parts.iter().position(|part| *part == "moves").unwrap_or(parts.len());

        let mut board = match parts.first() {
            Some(&"startpos") => Board::new(),
            Some(&"fen") => Board::from_fen(&parts[1..moves_at].join(" "))?,
            _ => return Err(ChessError::parse(&parts.join(" "), "expected `startpos` or `fen`")),
        };

        for move_text in parts.iter().skip(moves_at + 1) {
            apply_move_notation(&mut board, move_text)?;
        }

        debug!("position set: {}", board.to_fen());
        self.board = board;
        Ok(())
    }

    fn handle_go(&mut self, parts: &[&str]) -> Result<String> {
        let mut depth = self.depth;

        // Clock parameters are accepted but the search is depth-bounded only
        for i in 0..parts.len() {
            if parts[i] == "depth" {
                if let Some(value) = parts.get(i + 1).and_then(|s| s.parse::<u32>().ok()) {
                    depth = value.max(1);
                }
            }
        }

        let result = self.search.search(&mut self.board, depth)?;

        // UCI reports scores from the engine's side of the board
        let score = match self.board.side_to_move {
            Color::White => result.score,
            Color::Black => -result.score,
        };

        let mut response = format!(
            "info depth {} score cp {} nodes {}\n",
            result.depth, score, result.nodes
        );
        match result.best_move {
            Some(best_move) => response.push_str(&format!("bestmove {}\n", best_move)),
            None => response.push_str("bestmove (none)\n"),
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(commands: &str) -> (UciHandler, String) {
        let mut handler = UciHandler::new(2);
        let mut output = Vec::new();
        handler.run_with(commands.as_bytes(), &mut output).unwrap();
        (handler, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_handshake() {
        let (_, output) = session("uci\nisready\nquit\n");
        assert_eq!(
            output,
            format!("id name {}\nid author {}\nuciok\nreadyok\n", ENGINE_NAME, ENGINE_AUTHOR)
        );
    }

    #[test]
    fn test_position_startpos_with_moves() {
        let (handler, _) = session("position startpos moves e2e4 e7e5 g1f3\n");
        assert_eq!(
            handler.board().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_position_fen_with_moves() {
        let (handler, _) = session("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1 moves e2e4\n");
        assert_eq!(handler.board().to_fen(), "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1");
    }

    #[test]
    fn test_bad_position_keeps_previous_board() {
        let (handler, _) = session(concat!(
            "position startpos moves e2e4\n",
            "position startpos moves e2e4 e2e4\n",
            "position fen nonsense\n",
        ));
        assert_eq!(
            handler.board().to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_go_reports_info_and_bestmove() {
        let (_, output) = session("position startpos\ngo depth 1\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("info depth 1 score cp "));
        assert!(lines[1].starts_with("bestmove "));
        assert_eq!(lines[1].len(), "bestmove e2e4".len());
    }

    #[test]
    fn test_go_reports_score_for_side_to_move() {
        // Black to move can mate at once
        let (_, output) = session("position fen r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1\ngo depth 1\n");
        assert_eq!(output, "info depth 1 score cp 9999 nodes 18\nbestmove a8a1\n");
    }

    #[test]
    fn test_go_without_legal_moves() {
        let (_, output) = session("position fen R6k/6pp/8/8/8/8/8/K7 b - - 0 1\ngo\n");
        assert!(output.ends_with("bestmove (none)\n"));
    }

    #[test]
    fn test_ucinewgame_resets_board() {
        let (handler, _) = session("position startpos moves d2d4\nucinewgame\n");
        assert_eq!(handler.board(), &Board::new());
    }

    #[test]
    fn test_depth_is_at_least_one() {
        assert_eq!(UciHandler::new(0).depth(), 1);
        assert_eq!(UciHandler::default().depth(), DEFAULT_DEPTH);
    }

    #[test]
    fn test_quit_stops_reading() {
        let (handler, output) = session("quit\nposition startpos moves e2e4\nisready\n");
        assert_eq!(output, "");
        assert_eq!(handler.board(), &Board::new());
    }
}
