//! Column-name similarity for "did you mean" suggestions

/// Largest edit distance still considered a likely typo
pub const MAX_EDIT_DISTANCE: usize = 2;

/// Maximum number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 3;

/// Classic Levenshtein edit distance over chars.
///
/// Fills the full `(len1 + 1) x (len2 + 1)` table with unit costs for
/// insertion, deletion and substitution.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            matrix[i][j] = if a[i - 1] == b[j - 1] {
                matrix[i - 1][j - 1]
            } else {
                1 + matrix[i - 1][j - 1]
                    .min(matrix[i][j - 1])
                    .min(matrix[i - 1][j])
            };
        }
    }

    matrix[a.len()][b.len()]
}

/// Find candidates that look like what `target` was meant to be.
///
/// A candidate matches when either case-folded name contains the other, or
/// when their edit distance is at most [`MAX_EDIT_DISTANCE`]. Matches keep
/// candidate order (not sorted by distance) and are capped at
/// [`MAX_SUGGESTIONS`].
pub fn find_similar_columns<S: AsRef<str>>(target: &str, candidates: &[S]) -> Vec<String> {
    let target_lower = target.to_lowercase();

    candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .filter(|candidate: &&str| {
            let candidate_lower = candidate.to_lowercase();
            candidate_lower.contains(&target_lower)
                || target_lower.contains(&candidate_lower)
                || levenshtein_distance(&target_lower, &candidate_lower) <= MAX_EDIT_DISTANCE
        })
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basics() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("salary", "salary"), 0);
        assert_eq!(levenshtein_distance("salery", "salary"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("region", "regions"), 1);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let words = ["", "a", "name", "names", "first_name", "salary", "salery", "department"];
        for a in words {
            for b in words {
                assert_eq!(levenshtein_distance(a, b), levenshtein_distance(b, a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn test_distance_agrees_with_strsim() {
        let pairs = [
            ("hire_date", "hiredate"),
            ("office_location", "ofice_locaton"),
            ("manager_id", "managr"),
            ("emplyees", "employees"),
            ("caf\u{e9}", "cafe"),
        ];
        for (a, b) in pairs {
            assert_eq!(levenshtein_distance(a, b), strsim::levenshtein(a, b));
        }
    }

    #[test]
    fn test_single_typo() {
        let columns = ["salary", "department", "name"];
        assert_eq!(find_similar_columns("salery", &columns), vec!["salary"]);
    }

    #[test]
    fn test_no_match() {
        let columns = ["salary", "department", "name"];
        assert!(find_similar_columns("xyz123", &columns).is_empty());
    }

    #[test]
    fn test_substring_and_case() {
        let columns = ["employee_id", "first_name", "last_name", "email"];
        assert_eq!(find_similar_columns("FIRST", &columns), vec!["first_name"]);
        assert_eq!(find_similar_columns("Email_Address", &columns), vec!["email"]);
    }

    #[test]
    fn test_keeps_candidate_order_and_caps() {
        // "name" is a substring of all four; the closest one comes last.
        let columns = ["first_name", "last_name", "product_name", "name"];
        assert_eq!(
            find_similar_columns("name", &columns),
            vec!["first_name", "last_name", "product_name"]
        );
    }
}
