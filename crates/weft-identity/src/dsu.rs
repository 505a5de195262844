//! Union-find over compact ordinals.

/// Disjoint-set forest keyed by `u32` ordinals.
///
/// Union by rank; on equal rank the lower ordinal becomes the root. `find`
/// uses iterative path halving, so neither operation recurses.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Create `len` singleton sets. Callers guarantee `len <= u32::MAX`.
    pub fn new(len: u32) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len as usize],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set.
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Join the sets of `a` and `b`. Returns `false` if they were already one.
    pub fn union(&mut self, a: u32, b: u32) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }

        let (rank_a, rank_b) = (self.rank[ra as usize], self.rank[rb as usize]);
        let (root, child) = match rank_a.cmp(&rank_b) {
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Equal => {
                let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
                self.rank[root as usize] = self.rank[root as usize].saturating_add(1);
                (root, child)
            }
        };
        self.parent[child as usize] = root;
        true
    }

    /// All sets with their members in ascending order, ordered by smallest
    /// member.
    pub fn groups(&mut self) -> Vec<Vec<u32>> {
        let len = self.parent.len() as u32;
        let mut slot_of_root = vec![u32::MAX; self.parent.len()];
        let mut groups: Vec<Vec<u32>> = Vec::new();
        for x in 0..len {
            let root = self.find(x) as usize;
            if slot_of_root[root] == u32::MAX {
                slot_of_root[root] = groups.len() as u32;
                groups.push(Vec::new());
            }
            groups[slot_of_root[root] as usize].push(x);
        }
        groups
    }
}
