/// one line of a set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub valid: bool,
    /// only meaningful when `valid`
    pub tag: u64,
    pub last_used_time: u64,
    /// only read by FIFO
    pub arrival_time: u64,
}

impl Block {
    /// place a new line in this block, both timestamps move to `clock`
    pub(super) fn fill(&mut self, tag: u64, clock: u64) {
        self.valid = true;
        self.tag = tag;
        self.last_used_time = clock;
        self.arrival_time = clock;
    }
    pub(super) fn touch(&mut self, clock: u64) {
        self.last_used_time = clock;
    }
}

/// a fixed group of `associativity` blocks
#[derive(Debug, Clone)]
pub struct Set {
    blocks: Vec<Block>,
}

/// what a scan of a set found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Lookup {
    Hit(usize),
    /// no match, the first invalid way if there is one
    Miss(Option<usize>),
}

impl Set {
    pub fn new(associativity: usize) -> Self {
        Set {
            blocks: vec![Block::default(); associativity],
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(super) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// scan in way order, the first valid block with the same tag wins
    pub(super) fn lookup(&self, tag: u64) -> Lookup {
        let mut empty = None;
        for (way, block) in self.blocks.iter().enumerate() {
            if block.valid && block.tag == tag {
                return Lookup::Hit(way);
            }
            if !block.valid && empty.is_none() {
                empty = Some(way);
            }
        }
        Lookup::Miss(empty)
    }

    pub fn contains(&self, tag: u64) -> bool {
        matches!(self.lookup(tag), Lookup::Hit(_))
    }
}
