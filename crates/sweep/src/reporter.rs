use crate::candidate::{CrossWindows, Window};
use crate::event::ReportEvent;

/// Console wording of events for one candidate shape.
pub trait ReportTemplate {
    fn new_best_line(&self, metric: f64) -> String;
    fn near_best_line(&self, distance: f64, best_metric: f64) -> String;
}

impl ReportTemplate for CrossWindows {
    fn new_best_line(&self, metric: f64) -> String {
        format!(
            "!!!!!!!!!!!! -SMA Low: {}  -SMA High: {}  -Best Percentage: {} !!!!!!!!!!!!",
            self.low, self.high, metric
        )
    }

    fn near_best_line(&self, distance: f64, best_metric: f64) -> String {
        format!(
            "From Best: {:.2}%: -L: {} -H: {} -P: {}",
            distance, self.low, self.high, best_metric
        )
    }
}

impl ReportTemplate for Window {
    fn new_best_line(&self, metric: f64) -> String {
        format!(
            "!!!!!!!!!!!! -SMA Value: {}  -Best Percentage: {} !!!!!!!!!!!!",
            self.0, metric
        )
    }

    fn near_best_line(&self, distance: f64, best_metric: f64) -> String {
        format!("From Best: {:.2}%: -V: {} -P: {}", distance, self.0, best_metric)
    }
}

pub fn render<C: ReportTemplate>(event: &ReportEvent<C>) -> String {
    match event {
        ReportEvent::NewBest { candidate, metric } => candidate.new_best_line(*metric),
        ReportEvent::NearBest {
            candidate,
            best_metric,
            distance_from_best,
            ..
        } => candidate.near_best_line(*distance_from_best, *best_metric),
    }
}

/// Receives events in emission order.
pub trait ReportSink<C> {
    fn on_event(&mut self, event: &ReportEvent<C>);
}

/// Prints each event to stdout as it happens.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl<C: ReportTemplate> ReportSink<C> for ConsoleSink {
    fn on_event(&mut self, event: &ReportEvent<C>) {
        println!("{}", render(event));
    }
}

#[derive(Debug)]
pub struct CollectingSink<C> {
    pub events: Vec<ReportEvent<C>>,
}

impl<C> Default for CollectingSink<C> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<C: Clone> ReportSink<C> for CollectingSink<C> {
    fn on_event(&mut self, event: &ReportEvent<C>) {
        self.events.push(event.clone());
    }
}

#[derive(Debug, Default)]
pub struct NullSink;

impl<C> ReportSink<C> for NullSink {
    fn on_event(&mut self, _event: &ReportEvent<C>) {}
}
