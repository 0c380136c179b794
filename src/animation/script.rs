use crate::{
    animation::ease::Ease,
    animation::tier::DurationTier,
    animation::timeline::{Property, TimelineBuilder},
    foundation::core::ElementId,
    geometry::flip::MorphMode,
    phase::machine::Phase,
};

/// Authors one scene's timeline. Re-run on every rebuild (mount, debounced resize), so
/// implementations must not keep state between calls.
pub trait SceneScript: Send + Sync {
    fn author(&self, b: &mut TimelineBuilder<'_>);
}

impl<F> SceneScript for F
where
    F: Fn(&mut TimelineBuilder<'_>) + Send + Sync,
{
    fn author(&self, b: &mut TimelineBuilder<'_>) {
        self(b)
    }
}

/// Where a step starts inside its cycle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StepAt {
    Fraction(f64),
    Phase(Phase),
}

impl Default for StepAt {
    fn default() -> Self {
        Self::Fraction(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Tween {
        target: ElementId,
        property: Property,
        from: f64,
        to: f64,
        /// `None` repeats the step in every cycle.
        #[serde(default)]
        cycle: Option<usize>,
        #[serde(default)]
        at: StepAt,
        tier: DurationTier,
        #[serde(default)]
        ease: Ease,
    },
    Crossfade {
        outgoing: ElementId,
        incoming: ElementId,
        #[serde(default)]
        cycle: Option<usize>,
        #[serde(default)]
        at: StepAt,
        tier: DurationTier,
    },
    Flip {
        source: ElementId,
        target: ElementId,
        #[serde(default)]
        cycle: Option<usize>,
        #[serde(default)]
        at: StepAt,
        tier: DurationTier,
        mode: MorphMode,
        #[serde(default)]
        ease: Ease,
    },
}

/// Data-driven script, as loaded from a stage manifest.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ScriptedScene {
    pub steps: Vec<ScriptStep>,
}

fn cycles_of(b: &TimelineBuilder<'_>, cycle: Option<usize>) -> Vec<usize> {
    match cycle {
        Some(c) => vec![c],
        None => (0..b.cycles()).collect(),
    }
}

fn position(b: &TimelineBuilder<'_>, cycle: usize, at: StepAt) -> f64 {
    match at {
        StepAt::Fraction(f) => b.at(cycle, f),
        StepAt::Phase(p) => b.at_phase(cycle, p),
    }
}

impl SceneScript for ScriptedScene {
    fn author(&self, b: &mut TimelineBuilder<'_>) {
        for step in &self.steps {
            match step {
                ScriptStep::Tween {
                    target,
                    property,
                    from,
                    to,
                    cycle,
                    at,
                    tier,
                    ease,
                } => {
                    for c in cycles_of(b, *cycle) {
                        let pos = position(b, c, *at);
                        b.tween(target, *property, *from, *to, pos, *tier, *ease);
                    }
                }
                ScriptStep::Crossfade {
                    outgoing,
                    incoming,
                    cycle,
                    at,
                    tier,
                } => {
                    for c in cycles_of(b, *cycle) {
                        let pos = position(b, c, *at);
                        b.crossfade(outgoing, incoming, pos, *tier);
                    }
                }
                ScriptStep::Flip {
                    source,
                    target,
                    cycle,
                    at,
                    tier,
                    mode,
                    ease,
                } => {
                    for c in cycles_of(b, *cycle) {
                        let pos = position(b, c, *at);
                        b.flip(source, target, pos, *tier, *mode, *ease);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/script.rs"]
mod tests;
