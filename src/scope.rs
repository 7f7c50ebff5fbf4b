use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A stack of hash maps modelling lexical scopes.
///
/// `define` inserts only when the key is absent from the innermost scope;
/// `lookup` walks from the innermost scope outwards.
#[derive(Debug, Default)]
pub struct ScopedMap<K, V> {
    scopes: Vec<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> ScopedMap<K, V> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Returns false when the key already exists in the current scope.
    pub fn define(&mut self, key: K, value: V) -> bool {
        let scope = self.scopes.last_mut().expect("no scope pushed");
        if scope.contains_key(&key) {
            return false;
        }
        scope.insert(key, value);
        true
    }

    pub fn is_defined(&self, key: &K) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains_key(key))
    }

    /// Overwrite the key in the closest scope that holds it.
    pub fn update(&mut self, key: &K, value: V) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(key) {
                *slot = value;
                return;
            }
        }
    }

    pub fn lookup(&self, key: &K) -> Option<V> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(key).cloned())
    }

    pub fn lookup_on_current(&self, key: &K) -> Option<V> {
        self.scopes.last().and_then(|scope| scope.get(key).cloned())
    }

    /// Like `lookup`, but also reports the depth of the owning scope,
    /// outermost scope being level 0.
    pub fn lookup_with_level(&self, key: &K) -> Option<(V, usize)> {
        for (level, scope) in self.scopes.iter().enumerate().rev() {
            if let Some(value) = scope.get(key) {
                return Some((value.clone(), level));
            }
        }
        None
    }

    pub fn push_new_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_current_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn size(&self) -> usize {
        self.scopes.len()
    }
}

/// A stack of ordered lists with scope frames. Used for `defer` bookkeeping:
/// pushing to the front makes in-scope iteration reverse-insertion order, so
/// walking the current frame (and, on early return, every open frame from
/// the innermost outwards) yields the LIFO execution order.
#[derive(Debug, Default)]
pub struct ScopedList<T> {
    scopes: Vec<VecDeque<T>>,
}

impl<T: Clone> ScopedList<T> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push_front(&mut self, element: T) {
        self.scopes.last_mut().expect("no scope pushed").push_front(element);
    }

    pub fn push_back(&mut self, element: T) {
        self.scopes.last_mut().expect("no scope pushed").push_back(element);
    }

    /// Elements of the innermost frame, front first.
    pub fn current_scope_elements(&self) -> Vec<T> {
        self.scopes
            .last()
            .map(|scope| scope.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Elements of the frame at `level`, outermost frame being level 0.
    pub fn scope_elements(&self, level: usize) -> Vec<T> {
        self.scopes
            .get(level)
            .map(|scope| scope.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn push_new_scope(&mut self) {
        self.scopes.push(VecDeque::new());
    }

    pub fn pop_current_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn size(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_rejects_duplicates_in_same_scope_only() {
        let mut map: ScopedMap<String, i32> = ScopedMap::new();
        map.push_new_scope();
        assert!(map.define("x".to_owned(), 1));
        assert!(!map.define("x".to_owned(), 2));

        map.push_new_scope();
        assert!(map.define("x".to_owned(), 3));
        assert_eq!(map.lookup(&"x".to_owned()), Some(3));

        map.pop_current_scope();
        assert_eq!(map.lookup(&"x".to_owned()), Some(1));
    }

    #[test]
    fn lookup_with_level_reports_owning_scope() {
        let mut map: ScopedMap<&str, i32> = ScopedMap::new();
        map.push_new_scope();
        map.define("global", 0);
        map.push_new_scope();
        map.define("local", 1);

        assert_eq!(map.lookup_with_level(&"global"), Some((0, 0)));
        assert_eq!(map.lookup_with_level(&"local"), Some((1, 1)));
        assert_eq!(map.lookup_with_level(&"missing"), None);
        assert_eq!(map.lookup_on_current(&"global"), None);
    }

    #[test]
    fn scoped_list_orders_like_defer() {
        let mut list: ScopedList<&str> = ScopedList::new();
        list.push_new_scope();
        list.push_front("first registered");
        list.push_front("second registered");

        // Reverse-insertion within a scope.
        assert_eq!(
            list.current_scope_elements(),
            vec!["second registered", "first registered"]
        );

        list.push_new_scope();
        list.push_front("inner");
        assert_eq!(list.current_scope_elements(), vec!["inner"]);
        assert_eq!(list.size(), 2);

        // On early function exit the caller walks frames innermost first.
        let mut order = Vec::new();
        for level in (0..list.size()).rev() {
            order.extend(list.scope_elements(level));
        }
        assert_eq!(
            order,
            vec!["inner", "second registered", "first registered"]
        );

        list.pop_current_scope();
        assert_eq!(
            list.current_scope_elements(),
            vec!["second registered", "first registered"]
        );
    }
}
