use std::collections::HashSet;

use crate::common::types::UserId;

/// A skip vote on one track. The initiator always counts as a voter and the
/// quorum is fixed when the vote is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    initiator: UserId,
    voters: HashSet<UserId>,
    quorum: usize,
}

/// Result of casting a ballot into a vote slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Started { tally: usize, quorum: usize },
    Added { tally: usize, quorum: usize },
    AlreadyVoted { tally: usize, quorum: usize },
    Passed { tally: usize, quorum: usize },
}

impl Vote {
    pub fn new(initiator: UserId, quorum: usize) -> Self {
        let mut voters = HashSet::new();
        voters.insert(initiator);
        Self {
            initiator,
            voters,
            quorum,
        }
    }

    pub fn initiator(&self) -> UserId {
        self.initiator
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    pub fn contains(&self, voter: UserId) -> bool {
        self.voters.contains(&voter)
    }

    /// Returns false when `voter` had already voted.
    pub fn add(&mut self, voter: UserId) -> bool {
        self.voters.insert(voter)
    }

    pub fn voters(&self) -> Vec<UserId> {
        self.voters.iter().copied().collect()
    }

    pub fn is_passed(&self) -> bool {
        self.voters.len() >= self.quorum
    }

    pub fn remaining(&self) -> usize {
        self.quorum.saturating_sub(self.voters.len())
    }

    /// Cast `voter` into `slot`, creating the vote with `quorum` if there is
    /// none. A passed vote is left in the slot; the caller clears it once the
    /// outcome has been reported.
    pub fn cast(slot: &mut Option<Vote>, voter: UserId, quorum: usize) -> Ballot {
        match slot {
            None => {
                let vote = Vote::new(voter, quorum);
                let ballot = if vote.is_passed() {
                    Ballot::Passed {
                        tally: vote.len(),
                        quorum: vote.quorum,
                    }
                } else {
                    Ballot::Started {
                        tally: vote.len(),
                        quorum: vote.quorum,
                    }
                };
                *slot = Some(vote);
                ballot
            }
            Some(vote) if vote.contains(voter) => Ballot::AlreadyVoted {
                tally: vote.len(),
                quorum: vote.quorum,
            },
            Some(vote) => {
                vote.add(voter);
                if vote.is_passed() {
                    Ballot::Passed {
                        tally: vote.len(),
                        quorum: vote.quorum,
                    }
                } else {
                    Ballot::Added {
                        tally: vote.len(),
                        quorum: vote.quorum,
                    }
                }
            }
        }
    }
}
