use crate::subs::{Content, Descriptor, Mark, OptVariable, Rank, Variable};

/// The union-find store behind `Subs`.
///
/// Every variable owns a slot in two parallel vectors: `contents` holds the
/// equivalence class payload, `metadata` holds the redirect pointer plus the
/// rank/mark/copy fields of the descriptor. Splitting them keeps the common
/// "chase redirects" loop away from the (much larger) content values.
#[derive(Clone, Default)]
pub struct UnificationTable {
    contents: Vec<Content>,
    metadata: Vec<Combine>,
}

#[derive(Debug, Clone, Copy)]
struct Combine {
    redirect: OptVariable,
    /// Disjoint-set balancing rank, used only to decide which root survives
    /// a union. This is NOT the polymorphism rank in the descriptor; that
    /// one is user data and never consulted for balancing.
    weight: u32,
    rank: Rank,
    mark: Mark,
    copy: OptVariable,
}

impl UnificationTable {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            contents: Vec::with_capacity(cap),
            metadata: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn push(
        &mut self,
        content: Content,
        rank: Rank,
        mark: Mark,
        copy: OptVariable,
    ) -> Variable {
        let variable = Variable::from_index(self.len() as u32);

        self.contents.push(content);

        let combine = Combine {
            redirect: OptVariable::NONE,
            weight: 0,
            rank,
            mark,
            copy,
        };

        self.metadata.push(combine);

        variable
    }

    /// Overwrites the descriptor fields of a key the caller knows to be a
    /// root; the redirect and balancing rank are left alone.
    pub fn set_unchecked(
        &mut self,
        key: Variable,
        content: Content,
        rank: Rank,
        mark: Mark,
        copy: OptVariable,
    ) {
        let index = key.index() as usize;

        self.contents[index] = content;

        let combine = &mut self.metadata[index];
        combine.rank = rank;
        combine.mark = mark;
        combine.copy = copy;
    }

    pub fn modify<F, T>(&mut self, key: Variable, mapper: F) -> T
    where
        F: FnOnce(&mut Descriptor) -> T,
    {
        let root = self.root_key(key);
        let index = root.index() as usize;

        let combine = &self.metadata[index];

        let mut desc = Descriptor {
            content: self.contents[index].clone(),
            rank: combine.rank,
            mark: combine.mark,
            copy: combine.copy,
        };

        let result = mapper(&mut desc);

        self.set_unchecked(root, desc.content, desc.rank, desc.mark, desc.copy);

        result
    }

    // descriptor reads; the key may be any member of its class

    #[inline(always)]
    pub fn get_rank(&self, key: Variable) -> Rank {
        self.metadata[self.root_key_without_compacting(key).index() as usize].rank
    }

    #[inline(always)]
    pub fn get_mark(&self, key: Variable) -> Mark {
        self.metadata[self.root_key_without_compacting(key).index() as usize].mark
    }

    #[inline(always)]
    pub fn get_copy(&self, key: Variable) -> OptVariable {
        let index = self.root_key_without_compacting(key).index() as usize;
        self.metadata[index].copy
    }

    #[inline(always)]
    pub fn get_content(&self, key: Variable) -> &Content {
        &self.contents[self.root_key_without_compacting(key).index() as usize]
    }

    // writes that trust the caller to pass a root

    #[inline(always)]
    pub fn set_rank_unchecked(&mut self, key: Variable, value: Rank) {
        self.metadata[key.index() as usize].rank = value;
    }

    #[inline(always)]
    pub fn set_mark_unchecked(&mut self, key: Variable, value: Mark) {
        self.metadata[key.index() as usize].mark = value;
    }

    // writes that chase the root themselves

    #[inline(always)]
    pub fn set_rank(&mut self, key: Variable, value: Rank) {
        let index = self.root_key(key).index() as usize;
        self.metadata[index].rank = value;
    }

    #[inline(always)]
    pub fn set_mark(&mut self, key: Variable, value: Mark) {
        let index = self.root_key(key).index() as usize;
        self.metadata[index].mark = value;
    }

    #[inline(always)]
    pub fn set_copy(&mut self, key: Variable, value: OptVariable) {
        let index = self.root_key(key).index() as usize;
        self.metadata[index].copy = value;
    }

    #[inline(always)]
    pub fn set_content(&mut self, key: Variable, value: Content) {
        let index = self.root_key(key).index() as usize;
        self.contents[index] = value;
    }

    /// Returns the representative of the key's class, compressing the whole
    /// redirect path so later lookups are O(1).
    #[inline(always)]
    pub fn root_key(&mut self, mut key: Variable) -> Variable {
        let root = self.root_key_without_compacting(key);

        while key != root {
            let index = key.index() as usize;
            let next = self.metadata[index].redirect;
            self.metadata[index].redirect = OptVariable::from(root);

            match next.into_variable() {
                Some(next) => key = next,
                None => break,
            }
        }

        root
    }

    #[inline(always)]
    pub fn root_key_without_compacting(&self, mut key: Variable) -> Variable {
        while let Some(redirect) = self.metadata[key.index() as usize].redirect.into_variable() {
            key = redirect;
        }

        key
    }

    pub fn is_redirect(&self, key: Variable) -> bool {
        self.metadata[key.index() as usize].redirect.is_some()
    }

    pub fn unioned(&mut self, a: Variable, b: Variable) -> bool {
        self.root_key(a) == self.root_key(b)
    }

    /// Read the rank and stamp the mark in a single root chase; the
    /// generalization pass runs this over every pool inhabitant.
    #[inline(always)]
    pub fn get_rank_set_mark(&mut self, key: Variable, mark: Mark) -> Rank {
        let index = self.root_key(key).index() as usize;
        let metadata = &mut self.metadata[index];

        metadata.mark = mark;
        metadata.rank
    }

    /// Merges the two classes and installs `desc` on the surviving root.
    ///
    /// Which root survives is decided by the balancing rank, not by argument
    /// order; callers must not rely on either input staying a root. Unioning
    /// a class with itself just reinstalls the descriptor.
    pub fn union(&mut self, left: Variable, right: Variable, desc: Descriptor) {
        let l_root = self.root_key(left);
        let r_root = self.root_key(right);

        if l_root == r_root {
            self.set_unchecked(l_root, desc.content, desc.rank, desc.mark, desc.copy);
            return;
        }

        let l_weight = self.metadata[l_root.index() as usize].weight;
        let r_weight = self.metadata[r_root.index() as usize].weight;

        let (to, from) = if l_weight >= r_weight {
            (l_root, r_root)
        } else {
            (r_root, l_root)
        };

        if l_weight == r_weight {
            self.metadata[to.index() as usize].weight += 1;
        }

        self.metadata[from.index() as usize].redirect = OptVariable::from(to);

        self.set_unchecked(to, desc.content, desc.rank, desc.mark, desc.copy);
    }

    pub fn get_descriptor(&self, key: Variable) -> Descriptor {
        let index = self.root_key_without_compacting(key).index() as usize;
        let metadata = self.metadata[index];

        Descriptor {
            content: self.contents[index].clone(),
            rank: metadata.rank,
            mark: metadata.mark,
            copy: metadata.copy,
        }
    }

    pub fn set_descriptor(&mut self, key: Variable, desc: Descriptor) {
        let root = self.root_key(key);
        self.set_unchecked(root, desc.content, desc.rank, desc.mark, desc.copy);
    }
}
