//! Fuzzy string similarity used to decide whether two answers belong together.
//!
//! The ratio is the Ratcliff/Obershelp "gestalt" measure: find the longest
//! common block, recurse on the unmatched pieces to its left and right, and
//! report `2 * matched / total_len`.

use std::collections::{HashMap, HashSet};

/// Sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Case-insensitive similarity of two answers in `[0.0, 1.0]`.
///
/// Identical strings (ignoring case) score 1.0, strings sharing no characters
/// score 0.0. No punctuation or whitespace normalization happens here.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    // The block search breaks ties by position, so evaluate the pair in a
    // fixed order to keep the measure symmetric.
    if a <= b {
        ratio(&a, &b)
    } else {
        ratio(&b, &a)
    }
}

/// Normalize an answer for exact comparisons: trimmed, lowercase, ASCII
/// letters and digits only.
pub fn clean_answer(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(a, b).matched_len();
    2.0 * matched as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each element in `b`, ascending. Popular elements are left out.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, positions)| positions.len() > limit)
                .map(|(c, _)| *c)
                .collect();
            for c in popular {
                b2j.remove(&c);
            }
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`.
    ///
    /// Among equally long blocks the one starting earliest in `a` wins, then
    /// the one starting earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = if j > 0 {
                        j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                    } else {
                        1
                    };
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular elements never seed a block but may still extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_ignoring_case() {
        assert!(approx(similarity("Pizza", "pIZZA"), 1.0));
        assert!(approx(similarity("", ""), 1.0));
    }

    #[test]
    fn test_disjoint_is_zero() {
        assert!(approx(similarity("abc", "xyz"), 0.0));
        assert!(approx(similarity("", "anything"), 0.0));
    }

    #[test]
    fn test_trailing_punctuation_still_close() {
        // 5 matched chars out of 11 total
        let score = similarity("pizza", "Pizza!");
        assert!(approx(score, 10.0 / 11.0));
        assert!(score >= 0.75);
    }

    #[test]
    fn test_known_ratios() {
        // "abcd" / "bcde": block "bcd"
        assert!(approx(similarity("abcd", "bcde"), 6.0 / 8.0));
        // "red" / "blue": only "e" lines up
        assert!(approx(similarity("red", "blue"), 2.0 / 7.0));
        assert!(approx(similarity("tacos", "pizza"), 0.2));
    }

    #[test]
    fn test_recurses_around_longest_block() {
        // " cat" matches, "a" and "the" share nothing
        assert!(approx(similarity("the cat", "a cat"), 8.0 / 12.0));
        // "ab" then "d" to the right of it
        assert!(approx(similarity("abxd", "abd"), 6.0 / 7.0));
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("pizza", "Pizza!"),
            ("abcabc", "cbacba"),
            ("dog", "god"),
            ("new york", "york new"),
            ("banana", "ananas"),
        ];
        for (a, b) in pairs {
            assert!(
                approx(similarity(a, b), similarity(b, a)),
                "asymmetric for {a:?} / {b:?}"
            );
        }
    }

    #[test]
    fn test_in_unit_range() {
        for (a, b) in [("x", "xx"), ("hello world", "world hello"), ("aaaa", "a")] {
            let s = similarity(a, b);
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_long_sequences_with_popular_chars() {
        let a = "a".repeat(250);
        let b = "a".repeat(250);
        assert!(approx(similarity(&a, &b), 1.0));

        let c = format!("{}b", "a".repeat(249));
        let score = similarity(&a, &c);
        assert!(score > 0.99 && score < 1.0);
    }

    #[test]
    fn test_clean_answer() {
        assert_eq!(clean_answer("  Pizza!! "), "pizza");
        assert_eq!(clean_answer("New-York"), "newyork");
        assert_eq!(clean_answer("???"), "");
    }
}
