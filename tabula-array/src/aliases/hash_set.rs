pub type HashSet<T> = hashbrown::HashSet<T>;
