//! Scrub-compatible scene timelines.
//!
//! A [`Timeline`] is a set of property tweens positioned at fractions of the scene (never at
//! wall-clock times). Sampling is a pure function of progress, so the same timeline replays
//! identically whether it is driven forward, backward, paused, or jumped across.
//!
//! Invariants of a built timeline:
//!
//! 1. `total_duration()` is exactly `1.0`. Authoring that overruns the scene is rescaled into
//!    it; authoring that stops early is padded, not stretched.
//! 2. Every crossfade pair is linear on both sides and shares one window, so the two opacities
//!    sum to one at every progress value.
//! 3. Tweens on missing elements are dropped at build time and reported via
//!    [`Timeline::skipped`].

use std::collections::BTreeMap;

use crate::{
    animation::ease::Ease,
    animation::tier::{DurationTier, TierSeconds},
    foundation::core::ElementId,
    foundation::math::{clamp01, lerp},
    geometry::flip::{FlipMorph, FlipTransform, MorphMode, TransformOrigin},
    host::SceneHost,
    phase::machine::{Phase, PhaseTable},
};

/// Animatable property of a host element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    TranslateX,
    TranslateY,
    ScaleX,
    ScaleY,
    /// `1.0` pins the transform origin to the top-left corner, `0.0` restores the centre.
    OriginPinned,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Tween {
    pub target: ElementId,
    pub property: Property,
    pub from: f64,
    pub to: f64,
    pub position: f64,
    pub duration: f64,
    pub ease: Ease,
}

impl Tween {
    pub fn end(&self) -> f64 {
        self.position + self.duration
    }

    /// Value at scene progress `p`; zero-length tweens are steps taken at `p >= position`.
    pub fn value_at(&self, p: f64) -> f64 {
        if self.duration <= 0.0 {
            return if p >= self.position { self.to } else { self.from };
        }
        if p >= self.end() {
            return self.to;
        }
        if p <= self.position {
            return self.from;
        }
        let t = clamp01((p - self.position) / self.duration);
        lerp(self.from, self.to, self.ease.apply(t))
    }
}

/// Two opacity tweens that hand one element over to another inside a shared window.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CrossfadePair {
    pub outgoing: ElementId,
    pub incoming: ElementId,
    pub position: f64,
    pub duration: f64,
}

type TrackKey = (ElementId, Property);

/// Sampled property values for one progress value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameValues {
    values: BTreeMap<String, BTreeMap<Property, f64>>,
}

impl FrameValues {
    pub fn get(&self, target: &ElementId, property: Property) -> Option<f64> {
        self.values.get(target.as_str())?.get(&property).copied()
    }

    pub fn len(&self) -> usize {
        self.values.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, target: &ElementId, property: Property, value: f64) {
        self.values
            .entry(target.0.clone())
            .or_default()
            .insert(property, value);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Timeline {
    tracks: BTreeMap<TrackKey, Vec<Tween>>,
    crossfades: Vec<CrossfadePair>,
    morphs: Vec<FlipMorph>,
    skipped: Vec<ElementId>,
    content_end: f64,
    duration: f64,
}

impl Timeline {
    /// Scene length covered by the timeline: the authored content, padded out to `1.0`.
    pub fn total_duration(&self) -> f64 {
        self.duration
    }

    /// Latest end of any tween after rescaling.
    pub fn content_end(&self) -> f64 {
        self.content_end
    }

    pub fn len(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tweens(&self) -> impl Iterator<Item = &Tween> {
        self.tracks.values().flatten()
    }

    pub fn crossfades(&self) -> &[CrossfadePair] {
        &self.crossfades
    }

    pub fn morphs(&self) -> &[FlipMorph] {
        &self.morphs
    }

    /// Targets whose tweens were dropped because the element was not mounted.
    pub fn skipped(&self) -> &[ElementId] {
        &self.skipped
    }

    /// Value of one track at `p`. Before the first tween the track holds its first `from`;
    /// afterwards the latest-started tween wins.
    pub fn value(&self, target: &ElementId, property: Property, p: f64) -> Option<f64> {
        let track = self.tracks.get(&(target.clone(), property))?;
        Some(sample_track(track, clamp01(p)))
    }

    pub fn sample(&self, p: f64) -> FrameValues {
        let p = clamp01(p);
        let mut out = FrameValues::default();
        for ((target, property), track) in &self.tracks {
            out.insert(target, *property, sample_track(track, p));
        }
        out
    }

    pub fn origin_at(&self, target: &ElementId, p: f64) -> TransformOrigin {
        match self.value(target, Property::OriginPinned, p) {
            Some(v) if v >= 0.5 => TransformOrigin::TopLeft,
            _ => TransformOrigin::Center,
        }
    }
}

fn sample_track(track: &[Tween], p: f64) -> f64 {
    let idx = track.partition_point(|t| t.position <= p);
    if idx == 0 {
        return track[0].from;
    }
    track[idx - 1].value_at(p)
}

/// Builds one scene's [`Timeline`]. Positions are expressed as `cycle_start + fraction *
/// cycle_len`; durations come from [`DurationTier`]s converted against the scene budget.
pub struct TimelineBuilder<'a> {
    host: &'a dyn SceneHost,
    phases: &'a PhaseTable,
    tiers: TierSeconds,
    budget_secs: f64,
    cycles: usize,
    tweens: Vec<Tween>,
    crossfades: Vec<CrossfadePair>,
    morphs: Vec<FlipMorph>,
    skipped: Vec<ElementId>,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(
        host: &'a dyn SceneHost,
        phases: &'a PhaseTable,
        tiers: TierSeconds,
        budget_secs: f64,
        cycles: usize,
    ) -> Self {
        Self {
            host,
            phases,
            tiers,
            budget_secs,
            cycles: cycles.max(1),
            tweens: Vec::new(),
            crossfades: Vec::new(),
            morphs: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn cycle_len(&self) -> f64 {
        1.0 / self.cycles as f64
    }

    /// Scene position of `fraction` inside cycle `cycle`.
    pub fn at(&self, cycle: usize, fraction: f64) -> f64 {
        let len = self.cycle_len();
        cycle.min(self.cycles - 1) as f64 * len + clamp01(fraction) * len
    }

    /// Scene position where `phase` begins inside cycle `cycle` (cycle start if absent).
    pub fn at_phase(&self, cycle: usize, phase: Phase) -> f64 {
        self.at(cycle, self.phases.band_start(phase).unwrap_or(0.0))
    }

    pub fn tier_len(&self, tier: DurationTier) -> f64 {
        self.tiers.fraction(tier, self.budget_secs)
    }

    fn mounted(&mut self, target: &ElementId) -> bool {
        if self.host.is_mounted(target) {
            return true;
        }
        tracing::debug!(%target, "timeline target missing, skipping entry");
        if !self.skipped.contains(target) {
            self.skipped.push(target.clone());
        }
        false
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tween(
        &mut self,
        target: &ElementId,
        property: Property,
        from: f64,
        to: f64,
        position: f64,
        tier: DurationTier,
        ease: Ease,
    ) -> &mut Self {
        let duration = self.tier_len(tier);
        self.tween_span(target, property, from, to, position, duration, ease)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tween_span(
        &mut self,
        target: &ElementId,
        property: Property,
        from: f64,
        to: f64,
        position: f64,
        duration: f64,
        ease: Ease,
    ) -> &mut Self {
        if !self.mounted(target) {
            return self;
        }
        self.tweens.push(Tween {
            target: target.clone(),
            property,
            from,
            to,
            position: position.max(0.0),
            duration: duration.max(0.0),
            ease,
        });
        self
    }

    /// Zero-length change from `from` to `to` at `position`.
    pub fn step(
        &mut self,
        target: &ElementId,
        property: Property,
        from: f64,
        to: f64,
        position: f64,
    ) -> &mut Self {
        self.tween_span(target, property, from, to, position, 0.0, Ease::Linear)
    }

    /// Linear, complementary opacity handover. Both sides share one window; if either element
    /// is missing neither tween is added.
    pub fn crossfade(
        &mut self,
        outgoing: &ElementId,
        incoming: &ElementId,
        position: f64,
        tier: DurationTier,
    ) -> &mut Self {
        let out_ok = self.mounted(outgoing);
        let in_ok = self.mounted(incoming);
        if !(out_ok && in_ok) {
            return self;
        }
        let duration = self.tier_len(tier);
        self.tween_span(outgoing, Property::Opacity, 1.0, 0.0, position, duration, Ease::Linear);
        self.tween_span(incoming, Property::Opacity, 0.0, 1.0, position, duration, Ease::Linear);
        self.crossfades.push(CrossfadePair {
            outgoing: outgoing.clone(),
            incoming: incoming.clone(),
            position: position.max(0.0),
            duration,
        });
        self
    }

    /// Layout morph of `source` onto `target`'s rectangle, measured now.
    ///
    /// Adds translate/scale tweens plus origin steps: pinned at the morph start, released at its
    /// end only when the element lands back on the identity transform.
    pub fn flip(
        &mut self,
        source: &ElementId,
        target: &ElementId,
        position: f64,
        tier: DurationTier,
        mode: MorphMode,
        ease: Ease,
    ) -> &mut Self {
        if !self.mounted(source) {
            return self;
        }
        let duration = self.tier_len(tier);
        let morph = FlipMorph::measure(
            self.host,
            source,
            target,
            position,
            position + duration,
            mode,
        );
        let (first, last) = match mode {
            MorphMode::ToTarget => (FlipTransform::IDENTITY, morph.transform),
            MorphMode::FromTarget => (morph.transform, FlipTransform::IDENTITY),
        };
        let span = morph.end - morph.start;
        for (property, a, b) in [
            (Property::TranslateX, first.translate_x, last.translate_x),
            (Property::TranslateY, first.translate_y, last.translate_y),
            (Property::ScaleX, first.scale_x, last.scale_x),
            (Property::ScaleY, first.scale_y, last.scale_y),
        ] {
            self.tween_span(source, property, a, b, morph.start, span, ease);
        }
        let pinned_before = match mode {
            MorphMode::ToTarget => 0.0,
            MorphMode::FromTarget => 1.0,
        };
        self.step(source, Property::OriginPinned, pinned_before, 1.0, morph.start);
        if last.is_identity() {
            self.step(source, Property::OriginPinned, 1.0, 0.0, morph.end);
        }
        self.morphs.push(morph);
        self
    }

    /// Finish the timeline with its duration normalized to exactly `1.0`.
    pub fn build(self) -> Timeline {
        let authored_end = self
            .tweens
            .iter()
            .map(Tween::end)
            .fold(0.0_f64, f64::max);
        let scale = if authored_end > 1.0 {
            tracing::debug!(authored_end, "timeline overruns scene, rescaling into [0, 1]");
            1.0 / authored_end
        } else {
            1.0
        };

        let mut tracks: BTreeMap<TrackKey, Vec<Tween>> = BTreeMap::new();
        for mut tw in self.tweens {
            tw.position = clamp01(tw.position * scale);
            tw.duration = (tw.duration * scale).min(1.0 - tw.position);
            tracks
                .entry((tw.target.clone(), tw.property))
                .or_default()
                .push(tw);
        }
        for track in tracks.values_mut() {
            track.sort_by(|a, b| a.position.total_cmp(&b.position));
        }

        let content_end = tracks
            .values()
            .flatten()
            .map(Tween::end)
            .fold(0.0_f64, f64::max);
        // Rescaled ends may land an ulp past 1.0.
        let duration = if content_end > 1.0 + 1e-9 {
            content_end
        } else {
            1.0
        };

        let crossfades = self
            .crossfades
            .into_iter()
            .map(|mut c| {
                c.position = clamp01(c.position * scale);
                c.duration = (c.duration * scale).min(1.0 - c.position);
                c
            })
            .collect();
        let morphs = self
            .morphs
            .into_iter()
            .map(|mut m| {
                m.start = clamp01(m.start * scale);
                m.end = clamp01(m.end * scale);
                m
            })
            .collect();

        Timeline {
            tracks,
            crossfades,
            morphs,
            skipped: self.skipped,
            content_end,
            duration,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
