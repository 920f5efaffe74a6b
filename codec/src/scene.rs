//! Scene-object payload, including the pet battle full update.
//!
//! The pet battle record has a fixed outer shape: two player sides with up to
//! three pets each, followed by three environment slots (the two sides' pads
//! and the shared weather).

use wire::Guid;

use crate::error::CodecResult;
use crate::reader::EntryReader;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneObjectCreate {
    pub local_script_data: Option<String>,
    pub pet_battle: Option<Box<PetBattleFullUpdate>>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetBattleFullUpdate {
    pub players: [PetBattlePlayer; 2],
    pub environments: [PetBattleEnvironment; 3],
    pub waiting_for_front_pets_max_secs: i16,
    pub pvp_max_round_time: i16,
    pub cur_round: i32,
    pub npc_creature_id: i32,
    pub npc_display_id: i32,
    pub cur_pet_battle_state: u8,
    pub forfeit_penalty: u8,
    pub initial_wild_pet: Guid,
    pub is_pvp: bool,
    pub can_award_xp: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetBattlePlayer {
    pub character: Guid,
    pub trap_ability_id: i32,
    pub trap_status: i32,
    pub round_time_secs: i16,
    pub front_pet: u8,
    pub input_flags: u8,
    /// At most three; the count is a 2-bit field.
    pub pets: Vec<PetBattlePet>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetBattlePet {
    pub guid: Guid,
    pub species_id: i32,
    pub display_id: i32,
    pub collar_id: i32,
    pub level: i16,
    pub xp: i16,
    pub cur_health: i32,
    pub max_health: i32,
    pub power: i32,
    pub speed: i32,
    pub npc_team_member_id: i32,
    pub breed_quality: i16,
    pub status_flags: i16,
    pub slot: u8,
    pub abilities: Vec<PetAbility>,
    pub auras: Vec<PetAura>,
    pub states: Vec<PetState>,
    pub custom_name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetBattleEnvironment {
    pub auras: Vec<PetAura>,
    pub states: Vec<PetState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetAbility {
    pub ability_id: i32,
    pub cooldown_remaining: i16,
    pub lockdown_remaining: i16,
    pub ability_index: u8,
    pub pboid: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetAura {
    pub ability_id: i32,
    pub instance_id: i32,
    pub rounds_remaining: i32,
    pub current_round: i32,
    pub caster_pboid: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PetState {
    pub state_id: i32,
    pub state_value: i32,
}

pub(crate) fn decode_scene_object(r: &mut EntryReader<'_, '_>) -> CodecResult<SceneObjectCreate> {
    r.align();
    let has_script_data = r.bit("CliSceneLocalScriptData")?;
    let has_pet_battle = r.bit("PetBattleFullUpdate")?;
    r.align();

    let local_script_data = if has_script_data {
        Some(r.short_string("Data")?)
    } else {
        None
    };

    let pet_battle = if has_pet_battle {
        Some(Box::new(decode_pet_battle(r)?))
    } else {
        None
    };

    Ok(SceneObjectCreate {
        local_script_data,
        pet_battle,
    })
}

fn decode_pet_battle(r: &mut EntryReader<'_, '_>) -> CodecResult<PetBattleFullUpdate> {
    let players = [
        r.indexed(0, decode_player)?,
        r.indexed(1, decode_player)?,
    ];
    let environments = [
        r.indexed(0, decode_environment)?,
        r.indexed(1, decode_environment)?,
        r.indexed(2, decode_environment)?,
    ];

    let waiting_for_front_pets_max_secs = r.i16("WaitingForFrontPetsMaxSecs")?;
    let pvp_max_round_time = r.i16("PvpMaxRoundTime")?;
    let cur_round = r.i32("CurRound")?;
    let npc_creature_id = r.i32("NpcCreatureID")?;
    let npc_display_id = r.i32("NpcDisplayID")?;
    let cur_pet_battle_state = r.u8("CurPetBattleState")?;
    let forfeit_penalty = r.u8("ForfeitPenalty")?;
    let initial_wild_pet = r.guid("InitialWildPetGUID")?;

    r.align();
    let is_pvp = r.bit("IsPVP")?;
    let can_award_xp = r.bit("CanAwardXP")?;
    r.align();

    Ok(PetBattleFullUpdate {
        players,
        environments,
        waiting_for_front_pets_max_secs,
        pvp_max_round_time,
        cur_round,
        npc_creature_id,
        npc_display_id,
        cur_pet_battle_state,
        forfeit_penalty,
        initial_wild_pet,
        is_pvp,
        can_award_xp,
    })
}

fn decode_player(r: &mut EntryReader<'_, '_>) -> CodecResult<PetBattlePlayer> {
    let character = r.guid("CharacterID")?;
    let trap_ability_id = r.i32("TrapAbilityID")?;
    let trap_status = r.i32("TrapStatus")?;
    let round_time_secs = r.i16("RoundTimeSecs")?;
    let front_pet = r.u8("FrontPet")?;
    let input_flags = r.u8("InputFlags")?;

    r.align();
    let pet_count = r.bits("PetBattlePetUpdateCount", 2)? as usize;
    r.align();
    let pets = r.array(pet_count, decode_pet)?;

    Ok(PetBattlePlayer {
        character,
        trap_ability_id,
        trap_status,
        round_time_secs,
        front_pet,
        input_flags,
        pets,
    })
}

fn decode_pet(r: &mut EntryReader<'_, '_>) -> CodecResult<PetBattlePet> {
    let guid = r.guid("BattlePetGUID")?;
    let species_id = r.i32("SpeciesID")?;
    let display_id = r.i32("DisplayID")?;
    let collar_id = r.i32("CollarID")?;
    let level = r.i16("Level")?;
    let xp = r.i16("Xp")?;
    let cur_health = r.i32("CurHealth")?;
    let max_health = r.i32("MaxHealth")?;
    let power = r.i32("Power")?;
    let speed = r.i32("Speed")?;
    let npc_team_member_id = r.i32("NpcTeamMemberID")?;
    let breed_quality = r.i16("BreedQuality")?;
    let status_flags = r.i16("StatusFlags")?;
    let slot = r.u8("Slot")?;

    let ability_count = r.i32("PetBattleActiveAbility")?;
    let aura_count = r.i32("PetBattleActiveAura")?;
    let state_count = r.i32("PetBattleActiveState")?;

    let ability_count = r.check_signed_count(ability_count, 10)?;
    let abilities = r.array(ability_count, |r| {
        Ok(PetAbility {
            ability_id: r.i32("AbilityID")?,
            cooldown_remaining: r.i16("CooldownRemaining")?,
            lockdown_remaining: r.i16("LockdownRemaining")?,
            ability_index: r.u8("AbilityIndex")?,
            pboid: r.u8("Pboid")?,
        })
    })?;
    let auras = decode_auras(r, aura_count)?;
    let states = decode_states(r, state_count)?;

    let custom_name = r.short_string("CustomName")?;

    Ok(PetBattlePet {
        guid,
        species_id,
        display_id,
        collar_id,
        level,
        xp,
        cur_health,
        max_health,
        power,
        speed,
        npc_team_member_id,
        breed_quality,
        status_flags,
        slot,
        abilities,
        auras,
        states,
        custom_name,
    })
}

fn decode_environment(r: &mut EntryReader<'_, '_>) -> CodecResult<PetBattleEnvironment> {
    let aura_count = r.i32("PetBattleActiveAura")?;
    let state_count = r.i32("PetBattleActiveState")?;
    Ok(PetBattleEnvironment {
        auras: decode_auras(r, aura_count)?,
        states: decode_states(r, state_count)?,
    })
}

fn decode_auras(r: &mut EntryReader<'_, '_>, count: i32) -> CodecResult<Vec<PetAura>> {
    let count = r.check_signed_count(count, 17)?;
    r.array(count, |r| {
        Ok(PetAura {
            ability_id: r.i32("AbilityID")?,
            instance_id: r.i32("InstanceID")?,
            rounds_remaining: r.i32("RoundsRemaining")?,
            current_round: r.i32("CurrentRound")?,
            caster_pboid: r.u8("CasterPBOID")?,
        })
    })
}

fn decode_states(r: &mut EntryReader<'_, '_>, count: i32) -> CodecResult<Vec<PetState>> {
    let count = r.check_signed_count(count, 8)?;
    r.array(count, |r| {
        Ok(PetState {
            state_id: r.i32("StateID")?,
            state_value: r.i32("StateValue")?,
        })
    })
}
