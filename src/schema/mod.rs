pub mod loadout;
pub mod outcome;
pub mod round;
