//! Bounded command history: a fixed-capacity ring of strings plus the
//! Up/Down cursor that walks it the way an interactive shell does.

/// Fixed-capacity, insertion-ordered buffer of strings with FIFO eviction.
///
/// Items are addressed by logical index: 0 is the oldest surviving item and
/// `len() - 1` the most recently pushed. Logical index `i` lives in physical
/// slot `(head + i) % capacity`.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    slots: Vec<String>,
    head: usize,
    next_insert: usize,
    count: usize,
}

impl RingBuffer {
    /// Creates a buffer holding up to `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be positive");
        Self {
            slots: vec![String::new(); capacity],
            head: 0,
            next_insert: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Appends `item`, silently evicting the oldest entry when full.
    pub fn push(&mut self, item: String) {
        let capacity = self.slots.len();
        if self.count == capacity {
            // full: the slot at head is about to be overwritten
            self.head = (self.head + 1) % capacity;
        }
        self.slots[self.next_insert] = item;
        self.next_insert = (self.next_insert + 1) % capacity;
        if self.count < capacity {
            self.count += 1;
        }
    }

    /// Returns the item at `logical` (0 = oldest), or `None` when the index
    /// is out of range. Out-of-range lookups are a normal outcome, not an
    /// error.
    pub fn get(&self, logical: usize) -> Option<&str> {
        if logical >= self.count {
            return None;
        }
        let slot = (self.head + logical) % self.slots.len();
        Some(&self.slots[slot])
    }
}

/// Cursor position within a [`ReadlineHistory`]. `Bottom` is the virtual
/// line below the newest entry: nothing selected, shown as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Bottom,
    At(usize),
}

/// Shell-style Up/Down traversal over a bounded command history.
///
/// `up` moves toward older entries and sticks at the oldest one; `down`
/// moves toward newer entries and bottoms out at the empty string. Every
/// operation is total: an empty history returns the empty string and leaves
/// the cursor alone.
///
/// [`add_item`](Self::add_item) does not move the cursor. Callers that want
/// the next `up` to start from the newest entry must call
/// [`reset_iteration`](Self::reset_iteration) after inserting, or use
/// [`submit`](Self::submit) which does both; navigating after an un-reset
/// insert is undefined (it will not panic, but the positions visited are
/// unspecified).
#[derive(Debug, Clone)]
pub struct ReadlineHistory {
    buffer: RingBuffer,
    cursor: Cursor,
}

impl ReadlineHistory {
    /// Creates a history retaining up to `max_entries` commands; once full,
    /// each new command evicts the oldest one.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is zero.
    pub fn new(max_entries: usize) -> Self {
        Self {
            buffer: RingBuffer::new(max_entries),
            cursor: Cursor::Bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Appends `item` without touching the cursor.
    pub fn add_item(&mut self, item: String) {
        self.buffer.push(item);
    }

    /// Records a submitted line: append plus cursor reset in one step.
    pub fn submit(&mut self, item: String) {
        self.add_item(item);
        self.reset_iteration();
    }

    /// Returns the cursor to the bottom, below the newest entry.
    pub fn reset_iteration(&mut self) {
        self.cursor = Cursor::Bottom;
    }

    /// Moves toward older entries and returns the entry at the new position.
    /// At the oldest entry the cursor stays put and that entry is returned
    /// again.
    pub fn up(&mut self) -> &str {
        if self.buffer.is_empty() {
            return "";
        }
        let idx = match self.cursor {
            Cursor::Bottom => self.buffer.len() - 1,
            Cursor::At(i) if i > 0 => i - 1,
            Cursor::At(i) => i,
        };
        self.cursor = Cursor::At(idx);
        self.buffer.get(idx).unwrap_or("")
    }

    /// Moves toward newer entries and returns the entry at the new position.
    /// Moving past the newest entry lands on the bottom and returns the
    /// empty string, as does every further call.
    pub fn down(&mut self) -> &str {
        if self.buffer.is_empty() {
            return "";
        }
        match self.cursor {
            Cursor::Bottom => "",
            Cursor::At(i) if i + 1 < self.buffer.len() => {
                self.cursor = Cursor::At(i + 1);
                self.buffer.get(i + 1).unwrap_or("")
            }
            Cursor::At(_) => {
                self.cursor = Cursor::Bottom;
                ""
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadlineHistory, RingBuffer};

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_is_rejected() {
        let _ = RingBuffer::new(0);
    }

    #[test]
    fn fills_up_to_capacity() {
        let mut buf = RingBuffer::new(5);
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        let items = ["one", "two", "three", "four", "five"];
        for (n, item) in items.iter().enumerate() {
            buf.push(item.to_string());
            assert!(!buf.is_empty());
            assert_eq!(buf.len(), n + 1);
            for (i, expected) in items.iter().take(n + 1).enumerate() {
                assert_eq!(buf.get(i), Some(*expected));
            }
            assert_eq!(buf.get(n + 1), None);
        }
    }

    #[test]
    fn fifo_eviction_when_full() {
        let mut buf = RingBuffer::new(5);
        for item in ["one", "two", "three", "four", "five"] {
            buf.push(item.to_string());
        }
        let mut window = vec!["one", "two", "three", "four", "five"];
        for item in ["six", "seven", "eight", "nine", "ten", "eleven"] {
            buf.push(item.to_string());
            window.remove(0);
            window.push(item);
            assert_eq!(buf.len(), 5);
            for (i, expected) in window.iter().enumerate() {
                assert_eq!(buf.get(i), Some(*expected));
            }
        }
    }

    #[test]
    fn oldest_is_capacity_behind_newest() {
        let capacity = 3;
        let n = 10;
        let mut buf = RingBuffer::new(capacity);
        for i in 0..n {
            buf.push(format!("cmd{i}"));
        }
        assert_eq!(buf.len(), capacity);
        assert_eq!(buf.get(0), Some(format!("cmd{}", n - capacity).as_str()));
        assert_eq!(buf.get(capacity - 1), Some(format!("cmd{}", n - 1).as_str()));
    }

    #[test]
    fn empty_history_is_inert() {
        let mut history = ReadlineHistory::new(10);
        for _ in 0..3 {
            assert_eq!(history.up(), "");
            assert_eq!(history.down(), "");
        }
    }

    #[test]
    fn up_is_idempotent_at_the_oldest_entry() {
        let mut history = ReadlineHistory::new(10);
        for item in ["first", "second", "third"] {
            history.add_item(item.to_string());
        }
        history.reset_iteration();
        assert_eq!(history.up(), "third");
        assert_eq!(history.up(), "second");
        assert_eq!(history.up(), "first");
        assert_eq!(history.up(), "first");
        assert_eq!(history.up(), "first");
    }

    #[test]
    fn down_is_idempotent_at_the_bottom() {
        let mut history = ReadlineHistory::new(10);
        history.submit("only".to_string());
        assert_eq!(history.down(), "");
        assert_eq!(history.up(), "only");
        assert_eq!(history.down(), "");
        assert_eq!(history.down(), "");
        assert_eq!(history.down(), "");
    }

    #[test]
    fn round_trip_up_and_down() {
        let mut history = ReadlineHistory::new(10);
        for item in ["a", "b", "c"] {
            history.add_item(item.to_string());
        }
        history.reset_iteration();
        let mut gestures: Vec<String> = (0..4).map(|_| history.up().to_string()).collect();
        gestures.extend((0..4).map(|_| history.down().to_string()));
        assert_eq!(gestures, ["c", "b", "a", "a", "b", "c", "", ""]);
    }

    #[test]
    fn reset_returns_to_the_newest_entry() {
        let mut history = ReadlineHistory::new(10);
        for item in ["a", "b", "c"] {
            history.add_item(item.to_string());
        }
        history.reset_iteration();
        history.up();
        history.up();
        history.reset_iteration();
        assert_eq!(history.up(), "c");
    }

    #[test]
    fn submit_adds_and_resets() {
        let mut history = ReadlineHistory::new(10);
        history.submit("a".to_string());
        history.up();
        history.submit("b".to_string());
        assert_eq!(history.up(), "b");
        assert_eq!(history.up(), "a");
    }

    #[test]
    fn history_eviction_keeps_navigation_consistent() {
        let mut history = ReadlineHistory::new(2);
        history.submit("a".to_string());
        history.submit("b".to_string());
        history.submit("c".to_string());
        assert_eq!(history.len(), 2);
        assert_eq!(history.up(), "c");
        assert_eq!(history.up(), "b");
        assert_eq!(history.up(), "b");
        assert_eq!(history.down(), "c");
        assert_eq!(history.down(), "");
    }
}
