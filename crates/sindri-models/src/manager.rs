//! VRAM Model Manager (spec §4.6): admits models against a fixed VRAM
//! budget, evicting least-recently-used models and falling back to a
//! smaller model when eviction alone cannot make room.

use parking_lot::Mutex;
use tracing::{info, warn};

use sindri_domain::config::VramConfig;
use sindri_domain::error::{Error, Result};
use sindri_events::EventBus;
use sindri_domain::model::Event;

struct LoadedModel {
    model_id: String,
    estimated_gb: f64,
    /// Monotonic tick of last use; the lowest value is evicted first.
    last_used: u64,
}

struct State {
    loaded: Vec<LoadedModel>,
    clock: u64,
}

/// Tracks which models are currently resident and admits new ones
/// against a fixed budget, evicting LRU entries and falling back to a
/// smaller model when needed.
pub struct ModelManager {
    budget: VramConfig,
    state: Mutex<State>,
}

/// Snapshot of manager state for diagnostics/UI.
#[derive(Debug, Clone)]
pub struct ModelStats {
    pub used_gb: f64,
    pub loaded: Vec<String>,
}

impl ModelManager {
    pub fn new(budget: VramConfig) -> Self {
        Self {
            budget,
            state: Mutex::new(State {
                loaded: Vec::new(),
                clock: 0,
            }),
        }
    }

    fn usable_gb(&self) -> f64 {
        self.budget.usable_vram_gb()
    }

    fn used_gb(state: &State) -> f64 {
        state.loaded.iter().map(|m| m.estimated_gb).sum()
    }

    fn free_gb(&self, state: &State) -> f64 {
        (self.usable_gb() - Self::used_gb(state)).max(0.0)
    }

    fn touch(state: &mut State, model_id: &str) {
        state.clock += 1;
        let tick = state.clock;
        if let Some(m) = state.loaded.iter_mut().find(|m| m.model_id == model_id) {
            m.last_used = tick;
        }
    }

    /// Evict the least-recently-used loaded model. Returns its id, or
    /// `None` if nothing is loaded.
    fn evict_lru(state: &mut State) -> Option<String> {
        let idx = state
            .loaded
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| m.last_used)
            .map(|(i, _)| i)?;
        Some(state.loaded.remove(idx).model_id)
    }

    /// Admit `model_id`, evicting LRU entries as needed, falling back to
    /// `fallback_id` if the primary does not fit even after full
    /// eviction. Returns the id that was actually admitted.
    pub fn acquire(
        &self,
        events: &EventBus,
        model_id: &str,
        estimated_gb: f64,
        fallback_id: Option<&str>,
        fallback_gb: Option<f64>,
    ) -> Result<String> {
        events.publish(Event::ModelLoadRequested {
            model_id: model_id.to_string(),
        });

        let mut state = self.state.lock();

        if state.loaded.iter().any(|m| m.model_id == model_id) {
            Self::touch(&mut state, model_id);
            return Ok(model_id.to_string());
        }

        if estimated_gb > self.usable_gb() {
            // Won't ever fit, even with the whole budget free — go
            // straight to fallback without evicting anything.
            return self.admit_fallback(&mut state, events, model_id, fallback_id, fallback_gb);
        }

        while self.free_gb(&state) < estimated_gb {
            match Self::evict_lru(&mut state) {
                Some(evicted) => {
                    info!(model = %evicted, "evicting model to make room");
                    events.publish(Event::ModelEvicted {
                        model_id: evicted,
                    });
                }
                None => break,
            }
        }

        if self.free_gb(&state) >= estimated_gb {
            state.clock += 1;
            let tick = state.clock;
            state.loaded.push(LoadedModel {
                model_id: model_id.to_string(),
                estimated_gb,
                last_used: tick,
            });
            events.publish(Event::ModelLoaded {
                model_id: model_id.to_string(),
                estimated_gb,
            });
            return Ok(model_id.to_string());
        }

        self.admit_fallback(&mut state, events, model_id, fallback_id, fallback_gb)
    }

    fn admit_fallback(
        &self,
        state: &mut State,
        events: &EventBus,
        requested: &str,
        fallback_id: Option<&str>,
        fallback_gb: Option<f64>,
    ) -> Result<String> {
        let (fallback_id, fallback_gb) = match (fallback_id, fallback_gb) {
            (Some(id), Some(gb)) => (id, gb),
            _ => {
                return Err(Error::VRAMExhausted {
                    needed_gb: fallback_gb.unwrap_or(0.0),
                    available_gb: self.free_gb(state),
                })
            }
        };

        if let Some(existing) = state.loaded.iter().find(|m| m.model_id == fallback_id) {
            let _ = existing;
            Self::touch(state, fallback_id);
            warn!(requested, fallback = fallback_id, "falling back to resident smaller model");
            events.publish(Event::ModelFallback {
                requested: requested.to_string(),
                fallback: fallback_id.to_string(),
            });
            return Ok(fallback_id.to_string());
        }

        while self.free_gb(state) < fallback_gb {
            match Self::evict_lru(state) {
                Some(evicted) => {
                    info!(model = %evicted, "evicting model to make room for fallback");
                    events.publish(Event::ModelEvicted { model_id: evicted });
                }
                None => break,
            }
        }

        if self.free_gb(state) < fallback_gb {
            return Err(Error::VRAMExhausted {
                needed_gb: fallback_gb,
                available_gb: self.free_gb(state),
            });
        }

        state.clock += 1;
        let tick = state.clock;
        state.loaded.push(LoadedModel {
            model_id: fallback_id.to_string(),
            estimated_gb: fallback_gb,
            last_used: tick,
        });
        warn!(requested, fallback = fallback_id, "falling back to smaller model");
        events.publish(Event::ModelFallback {
            requested: requested.to_string(),
            fallback: fallback_id.to_string(),
        });
        Ok(fallback_id.to_string())
    }

    /// Drop `model_id` from the loaded set. A no-op if it isn't loaded —
    /// models are free to stay resident until evicted.
    pub fn release(&self, model_id: &str) {
        let mut state = self.state.lock();
        state.loaded.retain(|m| m.model_id != model_id);
    }

    pub fn stats(&self) -> ModelStats {
        let state = self.state.lock();
        ModelStats {
            used_gb: Self::used_gb(&state),
            loaded: state.loaded.iter().map(|m| m.model_id.clone()).collect(),
        }
    }
}
