use bio_types::genome::Position;
use derive_more::Constructor;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Constructor)]
pub struct Contig {
    name: String,
    length: Position,
}

impl Contig {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn length(&self) -> Position {
        self.length
    }
}
