use super::piece::Side;
use serde::Deserialize;
use serde::Serialize;

/// Castling availability per side and wing.
///
/// Rights only ever shrink: moving the king drops both wings, moving or
/// losing a rook drops its wing. Availability here is necessary but not
/// sufficient; the board still checks occupancy and attacked squares.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rights {
    pub white_short: bool,
    pub white_long: bool,
    pub black_short: bool,
    pub black_long: bool,
}

impl Default for Rights {
    fn default() -> Self {
        Self {
            white_short: true,
            white_long: true,
            black_short: true,
            black_long: true,
        }
    }
}

impl Rights {
    pub fn short(&self, side: Side) -> bool {
        match side {
            Side::White => self.white_short,
            Side::Black => self.black_short,
        }
    }
    pub fn long(&self, side: Side) -> bool {
        match side {
            Side::White => self.white_long,
            Side::Black => self.black_long,
        }
    }
    pub fn revoke_all(&mut self, side: Side) {
        match side {
            Side::White => {
                self.white_short = false;
                self.white_long = false;
            }
            Side::Black => {
                self.black_short = false;
                self.black_long = false;
            }
        }
    }
    /// revoke whichever wing this rook home square belongs to
    pub fn revoke_rook(&mut self, square: u8) {
        match square {
            0 => self.white_long = false,
            7 => self.white_short = false,
            56 => self.black_long = false,
            63 => self.black_short = false,
            _ => {}
        }
    }
}
