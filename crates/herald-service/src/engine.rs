//! The occurrence engine facade.
//!
//! Every entry point takes "now" explicitly and builds its own per-call state
//! (timezone resolutions, day boundaries, diagnostics); nothing is shared
//! between calls.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use herald_core::config::EngineConfig;
use herald_core::item::ScheduledItem;
use herald_core::types::{ActorRole, RecurrenceRule};
use herald_core::window::OccurrenceWindow;
use herald_rfc::rfc::ical::expand::{
    CompiledRule, Expansion, ExpansionError, ExpansionOptions, TimeZoneResolver, local_day,
};

use crate::error::{ServiceError, ServiceResult};
use crate::schedule::diagnostic::{Degradation, Diagnostic, Diagnostics, ItemRef};
use crate::schedule::interval::IntervalResolver;
use crate::schedule::merge::{MergeOutcome, SourceMerger};
use crate::schedule::restoration::{ActivityChange, RestorationDecision, decide_restoration};
use crate::schedule::retention::{
    RetentionDecision, RetentionEvaluator, RetentionFacts, RetentionReason, RuleExtent,
};
use crate::schedule::status::{ItemStatus, StatusClassifier};
use crate::schedule::tab::StatusTab;
use crate::schedule::ticker::{TickerScope, TickerTitles};

/// Classification of one item together with the degradations it hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEvaluation {
    pub status: ItemStatus,
    pub diagnostics: Vec<Diagnostic>,
}

/// An item whose rule compiled, ready for the pipeline.
struct PreparedItem<'a> {
    item: &'a ScheduledItem,
    rule: CompiledRule,
    intervals: IntervalResolver,
}

impl PreparedItem<'_> {
    fn classify(&self, classifier: &StatusClassifier, diagnostics: &mut Diagnostics) -> ItemStatus {
        classifier.classify(&self.rule, &self.intervals, diagnostics)
    }
}

/// State scoped to a single evaluation call.
#[derive(Debug, Default)]
struct CallContext {
    resolver: TimeZoneResolver,
    diagnostics: Diagnostics,
}

/// Stateless evaluator of scheduled items.
///
/// Holds only configuration. The items, the reference moment and any window
/// are passed to each call, so identical inputs always give identical output.
#[derive(Debug, Clone)]
pub struct OccurrenceEngine {
    zone: Tz,
    horizon: TimeDelta,
    retention: RetentionEvaluator,
    max_instances: u16,
}

impl OccurrenceEngine {
    #[must_use]
    pub fn new(zone: Tz, horizon: TimeDelta, grace_period: TimeDelta) -> Self {
        Self {
            zone,
            horizon,
            retention: RetentionEvaluator::new(grace_period),
            max_instances: ExpansionOptions::default().max_instances,
        }
    }

    #[must_use]
    pub fn with_max_instances(mut self, max_instances: u16) -> Self {
        self.max_instances = max_instances;
        self
    }

    /// ## Summary
    /// Builds an engine from configuration.
    ///
    /// ## Errors
    ///
    /// Returns an error if the numeric bounds are invalid or the timezone
    /// cannot be resolved.
    pub fn from_config(config: &EngineConfig) -> ServiceResult<Self> {
        config.validate()?;

        let zone = TimeZoneResolver::new()
            .resolve(&config.timezone)
            .map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))?;

        tracing::debug!(%zone, horizon_days = config.horizon_days, "Occurrence engine configured");

        Ok(Self::new(zone, config.horizon(), config.grace_period())
            .with_max_instances(config.max_instances))
    }

    #[must_use]
    pub fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub fn horizon(&self) -> TimeDelta {
        self.horizon
    }

    #[must_use]
    pub fn grace_period(&self) -> TimeDelta {
        self.retention.grace_period()
    }

    /// Classifier for `now` with this engine's zone and horizon.
    #[must_use]
    pub fn classifier(&self, now: DateTime<Utc>) -> StatusClassifier {
        StatusClassifier::new(now, self.zone, self.horizon)
    }

    fn expansion_options(&self) -> ExpansionOptions {
        ExpansionOptions::with_zone(self.zone).with_max_instances(self.max_instances)
    }

    /// Compiles an item's rule, reporting `InvalidRule` on failure.
    fn prepare<'a>(
        &self,
        item: &'a ScheduledItem,
        ctx: &mut CallContext,
    ) -> Option<PreparedItem<'a>> {
        match CompiledRule::compile(item.rule.as_str(), self.expansion_options(), &mut ctx.resolver)
        {
            Ok(rule) => {
                let intervals = IntervalResolver::new(
                    ItemRef::of(item),
                    &rule,
                    item.end_time_of_day.as_deref(),
                    &mut ctx.diagnostics,
                );
                Some(PreparedItem {
                    item,
                    rule,
                    intervals,
                })
            }
            Err(e) => {
                ctx.diagnostics.report(
                    Some(ItemRef::of(item)),
                    Degradation::InvalidRule {
                        reason: e.to_string(),
                    },
                );
                None
            }
        }
    }

    /// ## Summary
    /// Expands a rule over a window in this engine's zone.
    ///
    /// ## Errors
    ///
    /// Returns an error if the rule text is malformed.
    pub fn expand(
        &self,
        rule: &RecurrenceRule,
        window: &OccurrenceWindow,
    ) -> Result<Expansion, ExpansionError> {
        let compiled =
            CompiledRule::compile(rule.as_str(), self.expansion_options(), &mut TimeZoneResolver::new())?;
        Ok(compiled.expand(window))
    }

    /// ## Summary
    /// Classifies one item at `now`.
    ///
    /// An item whose rule does not parse is `NoOccurrence` with an
    /// `InvalidRule` diagnostic.
    #[must_use]
    pub fn classify(&self, item: &ScheduledItem, now: DateTime<Utc>) -> ItemEvaluation {
        let mut ctx = CallContext::default();
        let classifier = self.classifier(now);

        let status = match self.prepare(item, &mut ctx) {
            Some(prepared) => prepared.classify(&classifier, &mut ctx.diagnostics),
            None => ItemStatus::no_occurrence(&item.id, item.kind),
        };

        ItemEvaluation {
            status,
            diagnostics: ctx.diagnostics.into_vec(),
        }
    }

    /// ## Summary
    /// Merges the occurrences of all items inside `window` into one timeline.
    ///
    /// Rows are ordered by start, then item kind, then item id. Each item is
    /// also classified at `now`. An empty window yields an empty outcome with
    /// an `EmptyWindow` diagnostic; a broken item never aborts the batch.
    #[must_use]
    pub fn merge(
        &self,
        items: &[ScheduledItem],
        window: OccurrenceWindow,
        now: DateTime<Utc>,
    ) -> MergeOutcome {
        let mut ctx = CallContext::default();

        if window.is_empty() {
            ctx.diagnostics.report(
                None,
                Degradation::EmptyWindow {
                    from: window.from,
                    to: window.to,
                },
            );
            return MergeOutcome {
                diagnostics: ctx.diagnostics.into_vec(),
                ..MergeOutcome::default()
            };
        }

        let classifier = self.classifier(now);
        let mut merger = SourceMerger::new(window, now);
        let mut statuses = Vec::with_capacity(items.len());

        for item in items {
            let Some(prepared) = self.prepare(item, &mut ctx) else {
                statuses.push(ItemStatus::no_occurrence(&item.id, item.kind));
                continue;
            };

            statuses.push(prepared.classify(&classifier, &mut ctx.diagnostics));
            merger.push(item, &prepared.rule, &prepared.intervals, &mut ctx.diagnostics);
        }

        merger.finish(statuses, ctx.diagnostics)
    }

    /// ## Summary
    /// Merges from the start of today through the horizon.
    ///
    /// Starting at midnight keeps rows that began earlier today and are
    /// still in progress.
    #[must_use]
    pub fn upcoming_timeline(&self, items: &[ScheduledItem], now: DateTime<Utc>) -> MergeOutcome {
        let horizon_end = now
            .checked_add_signed(self.horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let window = OccurrenceWindow::new(local_day(now, self.zone).from, horizon_end);
        self.merge(items, window, now)
    }

    fn retention_of(
        &self,
        item: &ScheduledItem,
        classifier: &StatusClassifier,
        ctx: &mut CallContext,
    ) -> RetentionDecision {
        let Some(prepared) = self.prepare(item, ctx) else {
            return RetentionDecision::new(&item.id, RetentionReason::InvalidRule);
        };

        let status = prepared.classify(classifier, &mut ctx.diagnostics);
        let facts = RetentionFacts {
            extent: RuleExtent::of(&prepared.rule),
            status: status.status,
            last_occurrence_end: status.last_occurrence_end,
        };
        self.retention.evaluate(&item.id, facts, classifier.now())
    }

    /// ## Summary
    /// Decides whether one item may be cleaned up at `now`.
    #[must_use]
    pub fn evaluate_retention(&self, item: &ScheduledItem, now: DateTime<Utc>) -> RetentionDecision {
        let mut ctx = CallContext::default();
        self.retention_of(item, &self.classifier(now), &mut ctx)
    }

    /// ## Summary
    /// Returns the eligible cleanup decisions for `items` at `now`.
    #[must_use]
    pub fn cleanup_candidates(
        &self,
        items: &[ScheduledItem],
        now: DateTime<Utc>,
    ) -> Vec<RetentionDecision> {
        let mut ctx = CallContext::default();
        let classifier = self.classifier(now);

        let eligible: Vec<RetentionDecision> = items
            .iter()
            .map(|item| self.retention_of(item, &classifier, &mut ctx))
            .filter(|decision| decision.eligible)
            .collect();

        tracing::debug!(
            items = items.len(),
            eligible = eligible.len(),
            "Collected cleanup candidates"
        );
        eligible
    }

    fn is_active(&self, item: &ScheduledItem, classifier: &StatusClassifier, ctx: &mut CallContext) -> bool {
        self.prepare(item, ctx)
            .is_some_and(|prepared| prepared.classify(classifier, &mut ctx.diagnostics).status.is_active())
    }

    /// ## Summary
    /// Applies the restoration policy to an edit of `current` into `updated`.
    ///
    /// The edit restores the item when `current` is inactive at `now` and
    /// `updated` is active.
    #[must_use]
    pub fn evaluate_restoration(
        &self,
        current: &ScheduledItem,
        updated: &ScheduledItem,
        actor: ActorRole,
        now: DateTime<Utc>,
    ) -> RestorationDecision {
        let mut ctx = CallContext::default();
        let classifier = self.classifier(now);

        let activity = ActivityChange {
            was_active: self.is_active(current, &classifier, &mut ctx),
            becomes_active: self.is_active(updated, &classifier, &mut ctx),
        };
        decide_restoration(current, updated, actor, activity)
    }

    /// ## Summary
    /// Returns the dashboard tab of an item at `now`.
    #[must_use]
    pub fn tab_for(&self, item: &ScheduledItem, now: DateTime<Utc>) -> Option<StatusTab> {
        StatusTab::for_item(item, self.classify(item, now).status.status)
    }

    /// ## Summary
    /// Collects the titles of items occurring in the calendar `scope` around `now`.
    #[must_use]
    pub fn ticker_titles(
        &self,
        items: &[ScheduledItem],
        scope: TickerScope,
        now: DateTime<Utc>,
    ) -> TickerTitles {
        let mut ctx = CallContext::default();
        let window = scope.window(now, self.zone);
        let mut titles: Vec<String> = Vec::new();

        for item in items {
            let Some(prepared) = self.prepare(item, &mut ctx) else {
                continue;
            };
            let title = item.title.trim();
            if title.is_empty() || titles.iter().any(|seen| seen == title) {
                continue;
            }
            if prepared.rule.first_in(&window).is_some() {
                titles.push(title.to_string());
            }
        }

        TickerTitles {
            titles,
            diagnostics: ctx.diagnostics.into_vec(),
        }
    }
}
