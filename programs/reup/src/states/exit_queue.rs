use crate::error::ErrorCode;
use crate::states::Versioned;
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Exit queue: FIFO redemption requests paid out in stablecoins
// ──────────────────────────────────────────────────────────────────────────────
//

pub const EXIT_QUEUE_SEED: &str = "exit_queue";

/// PDA seed of the REUSD vault holding queued amounts.
pub const EXIT_VAULT_SEED: &str = "exit_vault";

/// Slots allocated at initialisation and added each time the ring fills up.
pub const EXIT_QUEUE_GROWTH: usize = 64;

/// Largest ring the queue grows to. The whole ring is deserialized on the
/// program heap, and growing briefly holds two copies of it.
pub const MAX_EXIT_QUEUE_CAPACITY: usize = 256;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct QueuedExit {
    pub user: Pubkey,
    /// REUSD still waiting to be redeemed.
    pub amount: u64,
}

/// One transfer produced by `ExitQueue::fund`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitPayout {
    /// Absolute queue position that was paid.
    pub index: u64,
    pub user: Pubkey,
    /// Stablecoin sent to `user`.
    pub stable_amount: u64,
    /// REUSD taken off the entry.
    pub reusd_amount: u64,
}

/// Growable ring buffer over absolute positions.
///
/// Position `p` lives in `entries[p % entries.len()]`. Positions in
/// `[queued_exit_start, queued_exit_end)` are open; every other slot is
/// either cleared or holds a stale value that `queued_exit_at` never exposes.
#[account]
#[derive(Default, Debug)]
pub struct ExitQueue {
    pub bump: u8,

    pub contract_version: u64,

    /// Program-owned REUSD vault receiving queued amounts.
    pub exit_vault: Pubkey,

    /// Sum of `amount` over open entries.
    pub total_queued: u64,

    /// First open position (inclusive).
    pub queued_exit_start: u64,

    /// One past the last open position (exclusive).
    pub queued_exit_end: u64,

    pub entries: Vec<QueuedExit>,
}

impl ExitQueue {
    /// Account size for a ring of `capacity` slots.
    ///
    /// Breakdown: discriminator, bump, version, vault, three u64 counters,
    /// then the vector prefix and `capacity` entries of 32 + 8.
    pub const fn space(capacity: usize) -> usize {
        8 + 1 + 8 + 32 + 8 * 3 + 4 + capacity * (32 + 8)
    }

    pub const LEN: usize = Self::space(EXIT_QUEUE_GROWTH);

    /// Allocates the initial ring.
    pub fn reset_entries(&mut self) {
        self.entries = vec![QueuedExit::default(); EXIT_QUEUE_GROWTH];
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Ring size `queue_exit` may need for one more request. Drives the
    /// account `realloc` before the handler runs.
    pub fn required_capacity(&self) -> usize {
        let capacity = self.capacity();
        if self.len() < capacity as u64 {
            capacity
        } else {
            (capacity + EXIT_QUEUE_GROWTH).min(MAX_EXIT_QUEUE_CAPACITY)
        }
    }

    fn slot(&self, position: u64) -> usize {
        (position % self.capacity().max(1) as u64) as usize
    }

    /// Re-lays the open range into a ring of `capacity` slots.
    fn grow(&mut self, capacity: usize) {
        let mut entries = vec![QueuedExit::default(); capacity];
        for position in self.queued_exit_start..self.queued_exit_end {
            entries[(position % capacity as u64) as usize] = self.entries[self.slot(position)];
        }
        self.entries = entries;
    }

    pub fn len(&self) -> u64 {
        self.queued_exit_end - self.queued_exit_start
    }

    pub fn is_empty(&self) -> bool {
        self.queued_exit_start == self.queued_exit_end
    }

    /// Entry at absolute `index`; the empty entry outside the open range.
    pub fn queued_exit_at(&self, index: u64) -> QueuedExit {
        if index < self.queued_exit_start || index >= self.queued_exit_end {
            return QueuedExit::default();
        }
        self.entries
            .get(self.slot(index))
            .copied()
            .unwrap_or_default()
    }

    /// Records a request for `amount` REUSD and returns its position.
    ///
    /// A request from the owner of the open tail entry grows that entry.
    pub fn queue_exit(&mut self, user: Pubkey, amount: u64) -> Result<u64> {
        require_gt!(amount, 0, ErrorCode::ZeroAmount);
        let total_queued = self
            .total_queued
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;

        if !self.is_empty() {
            let tail = self.queued_exit_end - 1;
            let slot = self.slot(tail);
            let entry = &mut self.entries[slot];
            if entry.user == user {
                entry.amount = entry
                    .amount
                    .checked_add(amount)
                    .ok_or(ErrorCode::MathOverflow)?;
                self.total_queued = total_queued;
                return Ok(tail);
            }
        }

        if self.len() >= self.capacity() as u64 {
            require!(
                self.capacity() < MAX_EXIT_QUEUE_CAPACITY,
                ErrorCode::QueueFull
            );
            self.grow(self.required_capacity());
        }
        let position = self.queued_exit_end;
        let slot = self.slot(position);
        self.entries[slot] = QueuedExit { user, amount };
        self.queued_exit_end += 1;
        self.total_queued = total_queued;
        Ok(position)
    }

    /// Walks the queue from the front, spending `stable_amount` of a
    /// stablecoin worth `factor` REUSD units per base unit.
    ///
    /// Payouts always round down to whole stablecoin units. A front entry that
    /// cannot be covered is reduced by the REUSD value actually paid and stays
    /// at the front.
    pub fn fund(&mut self, stable_amount: u64, factor: u64) -> Result<Vec<ExitPayout>> {
        require_gt!(stable_amount, 0, ErrorCode::ZeroAmount);
        require_gt!(factor, 0, ErrorCode::TokenNotSupported);
        let mut remaining = stable_amount
            .checked_mul(factor)
            .ok_or(ErrorCode::MathOverflow)?;

        let mut payouts = Vec::new();
        while !self.is_empty() && remaining > 0 {
            let position = self.queued_exit_start;
            let slot = self.slot(position);
            let entry = self.entries[slot];

            if entry.amount <= remaining {
                self.entries[slot] = QueuedExit::default();
                self.queued_exit_start += 1;
                self.total_queued -= entry.amount;
                remaining -= entry.amount;
                payouts.push(ExitPayout {
                    index: position,
                    user: entry.user,
                    stable_amount: entry.amount / factor,
                    reusd_amount: entry.amount,
                });
            } else {
                let stable = remaining / factor;
                let consumed = stable * factor;
                if consumed == 0 {
                    break;
                }
                self.entries[slot].amount -= consumed;
                self.total_queued -= consumed;
                remaining -= consumed;
                payouts.push(ExitPayout {
                    index: position,
                    user: entry.user,
                    stable_amount: stable,
                    reusd_amount: consumed,
                });
                break;
            }
        }
        Ok(payouts)
    }
}

impl Versioned for ExitQueue {
    fn contract_version(&self) -> u64 {
        self.contract_version
    }

    fn set_contract_version(&mut self, version: u64) {
        self.contract_version = version;
    }
}

#[cfg(test)]
mod exit_queue_tests {
    use super::*;
    use proptest::prelude::*;

    fn queue() -> ExitQueue {
        let mut q = ExitQueue::default();
        q.reset_entries();
        q
    }

    fn open_sum(q: &ExitQueue) -> u64 {
        (q.queued_exit_start..q.queued_exit_end)
            .map(|i| q.queued_exit_at(i).amount)
            .sum()
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let mut q = queue();
        let err = q.queue_exit(Pubkey::new_unique(), 0).unwrap_err();
        assert_eq!(err, error!(ErrorCode::ZeroAmount));
        let err = q.fund(0, 1).unwrap_err();
        assert_eq!(err, error!(ErrorCode::ZeroAmount));
    }

    #[test]
    fn tail_owner_coalesces() {
        let mut q = queue();
        let h1 = Pubkey::new_unique();
        let h2 = Pubkey::new_unique();
        assert_eq!(q.queue_exit(h2, 200).unwrap(), 0);
        assert_eq!(q.queue_exit(h1, 100).unwrap(), 1);
        assert_eq!(q.queue_exit(h1, 400).unwrap(), 1);

        assert_eq!(q.queued_exit_end, 2);
        assert_eq!(q.queued_exit_at(0), QueuedExit { user: h2, amount: 200 });
        assert_eq!(q.queued_exit_at(1), QueuedExit { user: h1, amount: 500 });
        assert_eq!(q.total_queued, 700);

        // only the front entry is covered
        let payouts = q.fund(200, 1).unwrap();
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].user, h2);
        assert_eq!(q.queued_exit_start, 1);
        assert_eq!(q.queued_exit_at(0), QueuedExit::default());
        assert_eq!(q.queued_exit_at(1), QueuedExit { user: h1, amount: 500 });
        assert_eq!(q.total_queued, 500);
    }

    #[test]
    fn interleaved_holders_do_not_coalesce() {
        let mut q = queue();
        let h1 = Pubkey::new_unique();
        let h2 = Pubkey::new_unique();
        q.queue_exit(h1, 100).unwrap();
        q.queue_exit(h2, 200).unwrap();
        q.queue_exit(h1, 400).unwrap();
        assert_eq!(q.len(), 3);

        let payouts = q.fund(100, 1).unwrap();
        assert_eq!(
            payouts,
            vec![ExitPayout {
                index: 0,
                user: h1,
                stable_amount: 100,
                reusd_amount: 100
            }]
        );
        assert_eq!(q.queued_exit_at(1), QueuedExit { user: h2, amount: 200 });
        assert_eq!(q.queued_exit_at(2), QueuedExit { user: h1, amount: 400 });
        assert_eq!(q.total_queued, 600);
    }

    #[test]
    fn emptied_queue_starts_a_fresh_tail() {
        let mut q = queue();
        let h1 = Pubkey::new_unique();
        q.queue_exit(h1, 10).unwrap();
        q.fund(10, 1).unwrap();
        assert!(q.is_empty());
        // the drained tail belonged to h1 but is no longer open
        assert_eq!(q.queue_exit(h1, 5).unwrap(), 1);
        assert_eq!(q.queued_exit_at(1).amount, 5);
    }

    #[test]
    fn partial_funding_splits_an_entry() {
        let mut q = queue();
        let h1 = Pubkey::new_unique();
        let h2 = Pubkey::new_unique();
        // REUSD has 9 decimals, the stablecoin 6
        let factor = 1_000;
        q.queue_exit(h1, 5_000_500).unwrap();
        q.queue_exit(h2, 3_000_000).unwrap();

        let payouts = q.fund(2_000, factor).unwrap();
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].stable_amount, 2_000);
        assert_eq!(payouts[0].reusd_amount, 2_000_000);
        assert_eq!(q.queued_exit_at(0).amount, 3_000_500);
        assert_eq!(q.queued_exit_start, 0);

        // entry 0 needs 3_000.5 stable units: paid 3_000 with the half unit dropped
        let payouts = q.fund(4_000, factor).unwrap();
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[0].stable_amount, 3_000);
        assert_eq!(payouts[0].reusd_amount, 3_000_500);
        assert_eq!(payouts[1].user, h2);
        assert_eq!(payouts[1].stable_amount, 999);
        assert_eq!(payouts[1].reusd_amount, 999_000);
        assert_eq!(q.queued_exit_at(1).amount, 2_001_000);
        assert_eq!(q.total_queued, 2_001_000);
    }

    #[test]
    fn funding_an_empty_queue_pays_nothing() {
        let mut q = queue();
        assert!(q.fund(1_000, 1).unwrap().is_empty());
    }

    #[test]
    fn full_ring_grows_and_keeps_order() {
        let mut q = queue();
        assert_eq!(q.capacity(), EXIT_QUEUE_GROWTH);
        assert_eq!(ExitQueue::LEN, ExitQueue::space(q.capacity()));

        // wrap the ring once so the open range straddles the end of `entries`
        for _ in 0..10 {
            q.queue_exit(Pubkey::new_unique(), 1).unwrap();
        }
        q.fund(10, 1).unwrap();
        let users: Vec<Pubkey> = (0..EXIT_QUEUE_GROWTH).map(|_| Pubkey::new_unique()).collect();
        for (k, user) in users.iter().enumerate() {
            q.queue_exit(*user, k as u64 + 1).unwrap();
        }
        assert_eq!(q.required_capacity(), 2 * EXIT_QUEUE_GROWTH);

        let extra = Pubkey::new_unique();
        let position = q.queue_exit(extra, 1_000).unwrap();
        assert_eq!(position, 10 + EXIT_QUEUE_GROWTH as u64);
        assert_eq!(q.capacity(), 2 * EXIT_QUEUE_GROWTH);
        assert_eq!(q.required_capacity(), q.capacity());
        for (k, user) in users.iter().enumerate() {
            assert_eq!(
                q.queued_exit_at(10 + k as u64),
                QueuedExit { user: *user, amount: k as u64 + 1 }
            );
        }
        assert_eq!(q.queued_exit_at(position), QueuedExit { user: extra, amount: 1_000 });
        assert_eq!(q.total_queued, open_sum(&q));

        // the front is still paid first
        let payouts = q.fund(1, 1).unwrap();
        assert_eq!(payouts[0].user, users[0]);
    }

    #[test]
    fn queue_reports_full_at_the_largest_ring() {
        let mut q = queue();
        for _ in 0..MAX_EXIT_QUEUE_CAPACITY {
            q.queue_exit(Pubkey::new_unique(), 1).unwrap();
        }
        assert_eq!(q.capacity(), MAX_EXIT_QUEUE_CAPACITY);
        assert_eq!(q.required_capacity(), MAX_EXIT_QUEUE_CAPACITY);
        let err = q.queue_exit(Pubkey::new_unique(), 1).unwrap_err();
        assert_eq!(err, error!(ErrorCode::QueueFull));

        // the tail owner can still top up
        let tail = q.queued_exit_at(q.queued_exit_end - 1).user;
        q.queue_exit(tail, 1).unwrap();

        // freeing the front slot makes room, and positions keep counting up
        q.fund(1, 1).unwrap();
        let position = q.queue_exit(Pubkey::new_unique(), 7).unwrap();
        assert_eq!(position, MAX_EXIT_QUEUE_CAPACITY as u64);
        assert_eq!(q.queued_exit_at(position).amount, 7);
        assert_eq!(q.queued_exit_at(0), QueuedExit::default());
    }

    #[test]
    fn reads_outside_the_open_range_are_empty() {
        let mut q = queue();
        assert_eq!(q.queued_exit_at(0), QueuedExit::default());
        assert_eq!(q.queued_exit_at(u64::MAX), QueuedExit::default());
        q.queue_exit(Pubkey::new_unique(), 3).unwrap();
        assert_eq!(q.queued_exit_at(1), QueuedExit::default());
    }

    proptest! {
        #[test]
        fn totals_and_order_are_preserved(
            ops in proptest::collection::vec((any::<bool>(), 0usize..3, 1u64..5_000), 1..120),
            factor_exp in 0u32..4,
        ) {
            let users = [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
            let factor = 10u64.pow(factor_exp);
            let mut q = queue();
            let mut queued = 0u64;
            let mut redeemed = 0u64;
            let mut last_paid: Option<u64> = None;

            for (is_fund, who, amount) in ops {
                if is_fund {
                    let payouts = q.fund(amount, factor).unwrap();
                    let mut spent = 0u64;
                    for (k, p) in payouts.iter().enumerate() {
                        // FIFO: positions never go backwards, and only the
                        // last payout of a batch may be partial
                        if let Some(prev) = last_paid {
                            prop_assert!(p.index >= prev);
                        }
                        last_paid = Some(p.index);
                        if k + 1 < payouts.len() {
                            prop_assert!(p.index < q.queued_exit_start);
                        }
                        prop_assert!(p.stable_amount * factor <= p.reusd_amount);
                        spent += p.stable_amount;
                        redeemed += p.reusd_amount;
                    }
                    prop_assert!(spent <= amount);
                } else if q.queue_exit(users[who], amount).is_ok() {
                    queued += amount;
                }
                prop_assert_eq!(q.total_queued, open_sum(&q));
                prop_assert_eq!(redeemed + q.total_queued, queued);
                prop_assert!(q.len() <= q.capacity() as u64);
                prop_assert!(q.capacity() <= MAX_EXIT_QUEUE_CAPACITY);
            }
        }
    }
}
