pub const DIGEST_LEN: usize = 32;

/// SHA-256 over the student id followed by the password.
pub type Digest = [u8; DIGEST_LEN];

pub type StudentId = String;

/// Assignment name -> grade, in roster column order.
pub type Grades = Vec<(String, String)>;
