use serde::Deserialize;
use serde::Serialize;

/// Ordered move log, space separated. Updates must append; a save that
/// overwrites would lose moves written by a concurrent save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Moves(String);

impl Moves {
    pub fn push(&mut self, uci: &str) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(uci);
    }

    pub fn list(&self) -> Vec<&str> {
        self.0.split_whitespace().collect()
    }

    pub fn len(&self) -> usize {
        self.0.split_whitespace().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Moves {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_appends_in_order() {
        let mut moves = Moves::default();
        moves.push("e2e4");
        moves.push("e7e5");
        moves.push("g1f3");
        assert!(moves.list() == vec!["e2e4", "e7e5", "g1f3"]);
        assert!(moves.to_string() == "e2e4 e7e5 g1f3");
    }
}
