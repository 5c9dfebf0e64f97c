//! Line-level change measurement

/// Number of changed lines between two texts
///
/// Both texts are split on `'\n'` and aligned by their longest common subsequence `L`; the score
/// is `(before - L) + (after - L)`, i.e. lines removed plus lines inserted. Moved lines are not
/// credited. An empty text counts as one empty line.
pub fn diff(before: &str, after: &str) -> usize {
    let before: Vec<&str> = before.split('\n').collect();
    let after: Vec<&str> = after.split('\n').collect();
    let common = lcs(&before, &after);
    (before.len() - common) + (after.len() - common)
}

fn lcs(a: &[&str], b: &[&str]) -> usize {
    // Two rolling rows of the classic O(n*m) table
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for line in a {
        for (j, other) in b.iter().enumerate() {
            current[j + 1] = if line == other {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
