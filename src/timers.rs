use std::time::Duration;

/// Handle returned by a host when it schedules a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Deferred work the controller asks the host to run later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Move focus to the close control after the panel opened.
    FocusClose,
    /// Return focus to the toggle after the panel closed.
    FocusToggle,
    /// Close the panel once a navigation scroll has started on narrow viewports.
    CloseAfterNavigate,
    /// Recompute the active section and progress once scrolling settles.
    ScrollSettle,
    /// Navigate to the fragment the page was loaded with.
    DeepLink(String),
}

/// A resettable timer slot, used for debouncing.
///
/// Callers cancel whatever `take` hands back before arming a new handle, so at
/// most one timer per slot is ever pending.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<TimerId>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<TimerId> {
        self.pending.take()
    }

    pub fn arm(&mut self, id: TimerId) {
        self.pending = Some(id);
    }

    /// Called when the timer fired; forgets the handle.
    pub fn fired(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }
}

/// Monotonic id source for hosts that keep their own timer queue.
#[derive(Debug, Default)]
pub struct TimerIds {
    next: u64,
}

impl TimerIds {
    pub fn next_id(&mut self) -> TimerId {
        self.next += 1;
        TimerId(self.next)
    }
}

/// A timer waiting in a host-side queue.
#[derive(Debug, Clone)]
pub struct ScheduledTimer {
    pub id: TimerId,
    pub due: Duration,
    pub task: TimerTask,
}

/// Ordered timer queue keyed on due time, ties broken by scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    ids: TimerIds,
    timers: Vec<ScheduledTimer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, task: TimerTask) -> TimerId {
        let id = self.ids.next_id();
        self.timers.push(ScheduledTimer {
            id,
            due: now + delay,
            task,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|timer| timer.id != id);
    }

    /// Earliest due time in the queue.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledTimer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)?;
        Some(self.timers.remove(index))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn contains(&self, task: &TimerTask) -> bool {
        self.timers.iter().any(|timer| &timer.task == task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_queue_pops_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), ms(300), TimerTask::CloseAfterNavigate);
        queue.schedule(ms(0), ms(100), TimerTask::FocusClose);
        queue.schedule(ms(0), ms(100), TimerTask::ScrollSettle);

        assert!(queue.pop_due(ms(50)).is_none());
        assert_eq!(queue.pop_due(ms(100)).unwrap().task, TimerTask::FocusClose);
        assert_eq!(queue.pop_due(ms(100)).unwrap().task, TimerTask::ScrollSettle);
        assert!(queue.pop_due(ms(299)).is_none());
        assert_eq!(queue.next_due(), Some(ms(300)));
        assert_eq!(
            queue.pop_due(ms(400)).unwrap().task,
            TimerTask::CloseAfterNavigate
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_slot_rearm_cancels_previous() {
        let mut queue = TimerQueue::new();
        let mut slot = TimerSlot::new();

        for step in 0..5 {
            if let Some(previous) = slot.take() {
                queue.cancel(previous);
            }
            slot.arm(queue.schedule(ms(step * 20), ms(100), TimerTask::ScrollSettle));
        }

        assert_eq!(queue.len(), 1);
        let timer = queue.pop_due(ms(200)).unwrap();
        assert_eq!(timer.due, ms(180));
        assert_eq!(slot.pending(), Some(timer.id));
        slot.fired();
        assert_eq!(slot.pending(), None);
    }
}
