/// Жизненный цикл одного поиска
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchPhase {
    Init,
    Scanning,
    Done,
}
