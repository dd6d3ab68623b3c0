use anchor_lang::prelude::*;
use anchor_lang::system_program;
use std::io::Cursor;

use crate::constants::*;
use crate::errors::{validate_user_id, LoyaltyError};
use crate::events::{AccountOpened, LedgerPosted};
use crate::ledger::Posting;
use crate::states::{Balance, LedgerEntry, UserAccount};

pub fn now() -> Result<i64> {
    Ok(Clock::get()?.unix_timestamp)
}

/// First touch of a user: fills a freshly created profile and balance.
/// Returns whether the user is new.
pub fn touch_user(
    user: &mut UserAccount,
    user_bump: u8,
    balance: &mut Balance,
    balance_bump: u8,
    user_id: &str,
    now: i64,
) -> Result<bool> {
    validate_user_id(user_id)?;
    let created = user.open(user_id, now, user_bump);
    balance.open(user_id, balance_bump);
    if created {
        msg!("Opened account for user {}", user_id);
        emit!(AccountOpened {
            user_id: user_id.to_string(),
            created_at: now,
        });
    }
    Ok(created)
}

/// Get-or-create for a user whose accounts arrive unchecked.
pub fn ensure_user<'info>(
    user_info: &AccountInfo<'info>,
    balance_info: &AccountInfo<'info>,
    payer: &Signer<'info>,
    system_program: &Program<'info, System>,
    user_id: &str,
    now: i64,
) -> Result<()> {
    validate_user_id(user_id)?;
    if !account_exists(user_info) {
        let bump = create_pda_account(
            payer,
            user_info,
            system_program,
            &[USER_SEED, user_id.as_bytes()],
            8 + UserAccount::SIZE,
        )?;
        let mut user = UserAccount::default();
        user.open(user_id, now, bump);
        write_account(user_info, &user)?;
        emit!(AccountOpened {
            user_id: user_id.to_string(),
            created_at: now,
        });
    } else {
        expect_pda(user_info, &[USER_SEED, user_id.as_bytes()])?;
    }
    if !account_exists(balance_info) {
        let bump = create_pda_account(
            payer,
            balance_info,
            system_program,
            &[BALANCE_SEED, user_id.as_bytes()],
            8 + Balance::SIZE,
        )?;
        let mut balance = Balance::default();
        balance.open(user_id, bump);
        write_account(balance_info, &balance)?;
    } else {
        expect_pda(balance_info, &[BALANCE_SEED, user_id.as_bytes()])?;
    }
    Ok(())
}

/// Checks that `info` sits at the PDA of `seeds` and returns its bump.
pub fn expect_pda(info: &AccountInfo, seeds: &[&[u8]]) -> Result<u8> {
    let (expected, bump) = Pubkey::find_program_address(seeds, &crate::ID);
    require_keys_eq!(info.key(), expected, LoyaltyError::UnexpectedAccountAddress);
    Ok(bump)
}

/// An account this program has already created.
pub fn account_exists(info: &AccountInfo) -> bool {
    info.owner == &crate::ID && !info.data_is_empty()
}

/// Deserializes a program account that may not exist yet.
pub fn read_account<T: AccountDeserialize>(info: &AccountInfo) -> Result<Option<T>> {
    if info.data_is_empty() {
        return Ok(None);
    }
    require_keys_eq!(*info.owner, crate::ID, LoyaltyError::ForeignAccount);
    let data = info.try_borrow_data()?;
    let mut slice: &[u8] = &data;
    Ok(Some(T::try_deserialize(&mut slice)?))
}

/// Writes `value` (discriminator included) over the account data.
pub fn write_account<T: AccountSerialize>(info: &AccountInfo, value: &T) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    let mut cursor = Cursor::new(&mut data[..]);
    value.try_serialize(&mut cursor)?;
    Ok(())
}

/// Creates a rent-exempt PDA of `space` bytes owned by this program.
///
/// Used for accounts that must only appear when an operation succeeds, so a
/// rejected call leaves no trace.
pub fn create_pda_account<'info>(
    payer: &Signer<'info>,
    target: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    seeds: &[&[u8]],
    space: usize,
) -> Result<u8> {
    let bump = expect_pda(target, seeds)?;
    require!(!account_exists(target), LoyaltyError::AccountAlreadyExists);

    let bump_seed = [bump];
    let mut signer_seeds: Vec<&[u8]> = seeds.to_vec();
    signer_seeds.push(&bump_seed);
    let signer: &[&[&[u8]]] = &[signer_seeds.as_slice()];

    let required = Rent::get()?.minimum_balance(space);
    let current = target.lamports();
    if current == 0 {
        let cpi_ctx = CpiContext::new_with_signer(
            system_program.to_account_info(),
            system_program::CreateAccount {
                from: payer.to_account_info(),
                to: target.clone(),
            },
            signer,
        );
        system_program::create_account(cpi_ctx, required, space as u64, &crate::ID)?;
        return Ok(bump);
    }

    // Someone pre-funded the address: top up, then allocate and assign.
    let top_up = required.saturating_sub(current);
    if top_up > 0 {
        let cpi_ctx = CpiContext::new(
            system_program.to_account_info(),
            system_program::Transfer {
                from: payer.to_account_info(),
                to: target.clone(),
            },
        );
        system_program::transfer(cpi_ctx, top_up)?;
    }
    let cpi_ctx = CpiContext::new_with_signer(
        system_program.to_account_info(),
        system_program::Allocate {
            account_to_allocate: target.clone(),
        },
        signer,
    );
    system_program::allocate(cpi_ctx, space as u64)?;
    let cpi_ctx = CpiContext::new_with_signer(
        system_program.to_account_info(),
        system_program::Assign {
            account_to_assign: target.clone(),
        },
        signer,
    );
    system_program::assign(cpi_ctx, &crate::ID)?;
    Ok(bump)
}

/// Appends `posting` to the user's log at `["entry", user_id, entry_count]`.
///
/// A client that derived `entry_info` from a stale count gets
/// `UnexpectedAccountAddress` and can rebuild the transaction.
pub fn post_entry<'info>(
    balance: &mut Balance,
    entry_info: &AccountInfo<'info>,
    payer: &Signer<'info>,
    system_program: &Program<'info, System>,
    posting: Posting,
    now: i64,
) -> Result<u64> {
    let seq = balance.entry_count;
    let seq_bytes = seq.to_le_bytes();
    create_pda_account(
        payer,
        entry_info,
        system_program,
        &[ENTRY_SEED, balance.user_id.as_bytes(), &seq_bytes],
        8 + LedgerEntry::SIZE,
    )?;
    balance.next_entry_seq()?;

    let entry = posting.into_entry(&balance.user_id, seq, now);
    write_account(entry_info, &entry)?;

    emit!(LedgerPosted {
        user_id: entry.user_id,
        seq,
        delta: entry.delta,
        kind: entry.kind.as_str().to_string(),
        memo: entry.memo,
        petals: balance.petals,
        created_at: now,
    });
    Ok(seq)
}

/// Newest hash in the SlotHashes sysvar.
///
/// Layout: `u64` entry count, then `(slot: u64, hash: [u8; 32])` entries,
/// newest first.
pub fn recent_slot_hash(slot_hashes: &AccountInfo) -> Result<[u8; 32]> {
    let data = slot_hashes.try_borrow_data()?;
    require!(data.len() >= 48, LoyaltyError::InvalidSlotHashes);
    let mut count = [0u8; 8];
    count.copy_from_slice(&data[..8]);
    require!(u64::from_le_bytes(count) > 0, LoyaltyError::InvalidSlotHashes);

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&data[16..48]);
    Ok(hash)
}
