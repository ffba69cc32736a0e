//! Seed patterns for the Life effect in plaintext form: one string per row,
//! `O` for a live cell, `.` for a dead one.

pub type Pattern = &'static [&'static str];

/// Travels one cell down and right every four generations.
pub const GLIDER: Pattern = &[
    ".O.",
    "..O",
    "OOO",
];

pub const R_PENTOMINO: Pattern = &[
    ".O.",
    "OO.",
    ".OO",
];

/// Period-15 oscillator.
pub const PENTADECATHLON: Pattern = &[
    "OOO",
    "O.O",
    "OOO",
    "OOO",
    "OOO",
    "OOO",
    "O.O",
    "OOO",
];

/// Ring of pulsars and friends.
pub const PULSAR: Pattern = &[
    "................O...O................",
    "..........OO....O...O....OO..........",
    "..........O.....O...O.....O..........",
    ".......OO.O...............O.OO.......",
    "......O.O.OO.............OO.O.O......",
    "......O.O......O.....O......O.O......",
    "....OO..O.....OOO...OOO.....O..OO....",
    "...O....OO.................OO....O...",
    "...OOOOO.....................OOOOO...",
    ".......O.....................O.......",
    ".OOOO...........................OOOO.",
    ".O..O...........................O..O.",
    ".....................................",
    "...............OO...OO...............",
    "......O.........O...O.........O......",
    ".....OO......O.........O......OO.....",
    "OOO...O......OO.......OO......O...OOO",
    ".....................................",
    ".....................................",
    ".....................................",
    "OOO...O......OO.......OO......O...OOO",
    ".....OO......O.........O......OO.....",
    "......O.........O...O.........O......",
    "...............OO...OO...............",
    ".....................................",
    ".O..O...........................O..O.",
    ".OOOO...........................OOOO.",
    ".......O.....................O.......",
    "...OOOOO.....................OOOOO...",
    "...O....OO.................OO....O...",
    "....OO..O.....OOO...OOO.....O..OO....",
    "......O.O......O.....O......O.O......",
    "......O.O.OO.............OO.O.O......",
    ".......OO.O...............O.OO.......",
    "..........O.....O...O.....O..........",
    "..........OO....O...O....OO..........",
    "................O...O................",
];

/// Gosper glider gun, firing down the screen.
pub const GLIDER_GUN: Pattern = &[
    "....OO...",
    "....OO...",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    "....OOO..",
    "...O...O.",
    "..O.....O",
    "..O.....O",
    ".....O...",
    "...O...O.",
    "....OOO..",
    ".....O...",
    ".........",
    ".........",
    "..OOO....",
    "..OOO....",
    ".O...O...",
    ".........",
    "OO...OO..",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    ".........",
    "..OO.....",
    "..OO.....",
];

pub const DRAGON: Pattern = &[
    "....OOO....OOO....",
    "....OOO....OOO....",
    "..................",
    "..................",
    "..................",
    "...OOOOO..OOOOO...",
    ".......O..O.......",
    ".....O..OO..O.....",
    "....OO......OO....",
    "...O..........O...",
    "..O............O..",
    "..................",
    "OOO............OOO",
    ".OOO..........OOO.",
    "...O..........O...",
    "...OOO......OOO...",
    "......O....O......",
    "....O........O....",
    "...O..O....O..O...",
    "..O..O......O..O..",
    "........OO........",
    "..O..O.O..O.O..O..",
    "........OO........",
    "...OOO......OOO...",
    "....O........O....",
    "....O........O....",
    "..O...O....O...O..",
    "..O...O....O...O..",
    ".O..O..O..O..O..O.",
];
