//! Frame-driven volume transitions.
//!
//! A fade is plain state advanced by `FadeScheduler::advance` once per
//! frame; nothing runs in the background. The scheduler never touches the
//! backend: `advance` returns the volumes and actions for the engine to
//! apply, which keeps it testable with synthetic deltas.

use jukebox_types::ClipId;
use serde::Serialize;

use super::ChannelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FadeState {
    Running,
    Completed,
    Cancelled,
}

/// Work to perform when a fade phase completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FadeAction {
    /// Start this clip on the music channel.
    SwitchClip(ClipId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum FadePhase {
    /// A plain fade.
    Single,
    /// Ducking out; switches to the clip when done, then fades back in.
    Out(ClipId),
    /// Second half of a crossfade.
    In,
}

/// One active volume transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FadeTask {
    channel: ChannelId,
    duration: f32,
    start_volume: f32,
    end_volume: f32,
    elapsed: f32,
    phase: FadePhase,
    state: FadeState,
}

impl FadeTask {
    fn new(channel: ChannelId, duration: f32, start_volume: f32, end_volume: f32, phase: FadePhase) -> Self {
        Self {
            channel,
            duration,
            start_volume,
            end_volume,
            elapsed: 0.0,
            phase,
            state: FadeState::Running,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn start_volume(&self) -> f32 {
        self.start_volume
    }

    pub fn end_volume(&self) -> f32 {
        self.end_volume
    }

    /// Progress through the current phase. May exceed 1.0 on the frame the
    /// phase completes; volumes are computed from the clamped value.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    /// Clip this task will switch to, if it is still ducking out.
    pub fn pending_clip(&self) -> Option<ClipId> {
        match self.phase {
            FadePhase::Out(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn is_crossfade(&self) -> bool {
        !matches!(self.phase, FadePhase::Single)
    }

    fn volume(&self) -> f32 {
        lerp(self.start_volume, self.end_volume, self.elapsed.clamp(0.0, 1.0))
    }
}

/// Volume update produced by one `advance` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeStep {
    pub channel: ChannelId,
    pub volume: f32,
    /// Fired when a crossfade's first phase completes.
    pub action: Option<FadeAction>,
    /// `Completed` on the step that finishes the task.
    pub state: FadeState,
}

/// Owns every running fade, at most one per channel.
#[derive(Debug, Default)]
pub struct FadeScheduler {
    tasks: Vec<FadeTask>,
}

impl FadeScheduler {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Start a fade on `channel`, cancelling any fade already running there.
    pub fn start_fade(&mut self, channel: ChannelId, duration_secs: f32, start_volume: f32, end_volume: f32) {
        self.cancel(channel);
        log::debug!(
            target: "audio::fade",
            "fade {:?} {} -> {} over {}s",
            channel,
            start_volume,
            end_volume,
            duration_secs
        );
        self.tasks.push(FadeTask::new(
            channel,
            duration_secs,
            start_volume,
            end_volume,
            FadePhase::Single,
        ));
    }

    /// Duck `channel` from `start_volume` to `end_volume`, switch to
    /// `next_clip`, then bring it back to `start_volume`. Both halves take
    /// `duration_secs`.
    pub fn start_crossfade(
        &mut self,
        channel: ChannelId,
        next_clip: ClipId,
        duration_secs: f32,
        start_volume: f32,
        end_volume: f32,
    ) {
        self.cancel(channel);
        log::debug!(
            target: "audio::fade",
            "crossfade {:?} to clip {} via {} over 2x{}s",
            channel,
            next_clip,
            end_volume,
            duration_secs
        );
        self.tasks.push(FadeTask::new(
            channel,
            duration_secs,
            start_volume,
            end_volume,
            FadePhase::Out(next_clip),
        ));
    }

    /// Cancel the fade on `channel` without firing its pending action.
    /// Returns the cancelled task.
    pub fn cancel(&mut self, channel: ChannelId) -> Option<FadeTask> {
        let pos = self.tasks.iter().position(|t| t.channel == channel)?;
        let mut task = self.tasks.remove(pos);
        task.state = FadeState::Cancelled;
        log::debug!(target: "audio::fade", "cancelled fade on {:?}", channel);
        Some(task)
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        count
    }

    pub fn is_fading(&self, channel: ChannelId) -> bool {
        self.tasks.iter().any(|t| t.channel == channel)
    }

    pub fn task(&self, channel: ChannelId) -> Option<&FadeTask> {
        self.tasks.iter().find(|t| t.channel == channel)
    }

    pub fn active(&self) -> &[FadeTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance every task by `delta_secs` and report the new volumes.
    ///
    /// Tasks whose progress reaches 1.0 complete and are removed, except a
    /// crossfade's first phase, which emits its switch action and restarts
    /// as the fade-in phase. A zero or negative duration completes on the
    /// first advance.
    pub fn advance(&mut self, delta_secs: f32) -> Vec<FadeStep> {
        let delta = delta_secs.max(0.0);
        let mut steps = Vec::with_capacity(self.tasks.len());

        for task in &mut self.tasks {
            task.elapsed += if task.duration > 0.0 {
                delta / task.duration
            } else {
                1.0
            };

            let volume = task.volume();
            let mut action = None;

            if task.elapsed >= 1.0 {
                match task.phase {
                    FadePhase::Out(next) => {
                        action = Some(FadeAction::SwitchClip(next));
                        task.phase = FadePhase::In;
                        std::mem::swap(&mut task.start_volume, &mut task.end_volume);
                        task.elapsed = 0.0;
                    }
                    FadePhase::Single | FadePhase::In => {
                        task.state = FadeState::Completed;
                    }
                }
            }

            steps.push(FadeStep {
                channel: task.channel,
                volume,
                action,
                state: task.state,
            });
        }

        self.tasks.retain(|t| t.state == FadeState::Running);
        steps
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
