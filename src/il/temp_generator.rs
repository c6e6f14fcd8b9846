use super::Temp;

/// Issues fresh temporaries. Temporaries are numbered from 1 and never handed out twice.
pub struct TempGenerator {
    index: usize,
}

impl TempGenerator {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Generates a new unique temporary.
    pub fn next_temp(&mut self) -> Temp {
        self.index += 1;
        Temp::new(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_temp_generates_ascending_temp_values() {
        let mut temp_gen = TempGenerator::new();

        assert_eq!("%1", temp_gen.next_temp().to_string());
        assert_eq!("%2", temp_gen.next_temp().to_string());
    }

    #[test]
    fn temps_are_never_reused() {
        let mut temp_gen = TempGenerator::new();
        let mut seen: Vec<_> = (0..100).map(|_| temp_gen.next_temp()).collect();
        seen.sort();
        seen.dedup();

        assert_eq!(100, seen.len());
    }
}
