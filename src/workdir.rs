//! Scratch directory naming
//!
//! Every deploy run works inside a freshly named directory under `/tmp` on
//! the remote host. Names are 10 random lowercase letters; collisions are
//! not checked, the 26^10 space makes them negligible.

use nanoid::nanoid;

const ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Length of the random token
pub const TOKEN_LEN: usize = 10;

/// Generate a fresh scratch directory path under `/tmp`
pub fn scratch_dir() -> String {
    format!("/tmp/{}", nanoid!(TOKEN_LEN, &ALPHABET))
}
