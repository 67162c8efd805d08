use std::iter::FromIterator;

/// Last-in first-out sequence.
///
/// Iterates from the top down and is written on the wire in that order.
/// Decoding pushes the items back bottom first, so a stack survives a round
/// trip with the same top.
///
/// ```rust
/// use wirejson::{Registry, Stack};
///
/// let mut stack = Stack::new();
/// stack.push(1);
/// stack.push(2);
///
/// let registry = Registry::new();
/// assert_eq!(registry.serialize(&stack).unwrap(), "[2,1]");
/// let back: Stack<i32> = registry.deserialize("[2,1]").unwrap();
/// assert_eq!(back.peek(), Some(&2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack<T> {
    // Bottom first.
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Stack { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Top first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Stack::new()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    /// Pushes the items in iteration order.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Stack {
            items: iter.into_iter().collect(),
        }
    }
}
