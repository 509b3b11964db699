use types::Weight;

/// Когда стратегия пересобирает портфель
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// На каждом баре
    EveryBar,
    /// На первом баре каждой ISO-недели
    Weekly,
}

/// Готовая к прогону стратегия: расписание + целевые веса по барам.
///
/// `targets[row][symbol]`: целевой вес инструмента на баре `row`.
/// Веса применяются только на барах, где срабатывает `schedule`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySpec {
    pub name: String,
    pub schedule: Schedule,
    pub targets: Vec<Vec<Weight>>,
}

impl StrategySpec {
    pub fn rows(&self) -> usize {
        self.targets.len()
    }
}
