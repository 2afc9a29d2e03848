use std::sync::Arc;

use game_core::{
    CoordsXYZD, PlacePeepSpawnAction, ScreenMode, SessionState, SetPlayerGroupAction,
    SetSandboxModeAction, TileCoordsXYZ, TileMap, TogglePauseAction,
};

use super::*;

const CLIENT: PlayerId = PlayerId(1);

fn world() -> World {
    let map = TileMap::new(64)
        .with_path(TileCoordsXYZ::new(1, 1, 0))
        .with_path(TileCoordsXYZ::new(2, 1, 0));
    World::new(Arc::new(map), Arc::new(SessionRegistry::with_default_groups()))
}

fn editor_state() -> GameState {
    GameState::new(SessionState::new(ScreenMode::ScenarioEditor))
}

fn dispatcher(role: SessionRole, player: PlayerId, state: GameState) -> Dispatcher {
    Dispatcher::new(role, player, state, world(), DispatchConfig::default())
}

fn spawn_at(x: i32) -> GameCommand {
    GameCommand::new(PlacePeepSpawnAction::new(CoordsXYZD::new(x, 32, 0, 0)))
}

/// Delivers everything `from` has queued for `to`, through the wire encoding.
fn pump(from: &mut Dispatcher, to: &mut Dispatcher) {
    let sender = from.local_player();
    for outgoing in from.take_outbox() {
        assert_eq!(outgoing.to, to.local_player(), "unexpected recipient");
        let bytes = outgoing.message.encode().unwrap();
        to.receive(sender, &bytes).unwrap();
    }
}

/// Host plus one synchronized client.
fn session() -> (Dispatcher, Dispatcher) {
    let mut host = dispatcher(SessionRole::Host, PlayerId::HOST, editor_state());
    let mut client = dispatcher(SessionRole::Client, CLIENT, GameState::default());
    host.connect_peer(CLIENT).unwrap();
    pump(&mut host, &mut client);
    host.take_events();
    client.take_events();
    (host, client)
}

fn action_outcomes(events: &[Event]) -> Vec<DispatchOutcome> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Action(action) => Some(action.outcome.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn local_submission_applies_immediately() {
    let mut local = dispatcher(SessionRole::Local, PlayerId::HOST, editor_state());

    let outcome = local.submit(spawn_at(32)).unwrap();

    assert!(matches!(outcome, DispatchOutcome::Applied(ref result) if result.is_ok()));
    assert_eq!(local.state().peep_spawns.len(), 1);
    let journal = local.take_journal();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].tick, Tick::ZERO);
    assert!(local.take_outbox().is_empty());
}

#[test]
fn pause_toggles_are_not_journaled() {
    let mut local = dispatcher(SessionRole::Local, PlayerId::HOST, editor_state());

    local.submit(GameCommand::new(TogglePauseAction)).unwrap();

    assert!(local.state().session.paused);
    assert!(local.take_journal().is_empty());
}

#[test]
fn ghost_commands_are_validated_but_never_applied() {
    let mut local = dispatcher(SessionRole::Local, PlayerId::HOST, editor_state());
    let before = local.state().clone();

    let outcome = local
        .submit(spawn_at(32).with_flags(CommandFlags::GHOST))
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::Previewed(ref result) if result.is_ok()));
    assert_eq!(local.state(), &before);
    assert!(local.take_journal().is_empty());
}

#[test]
fn admission_rejects_before_query() {
    let mut local = dispatcher(SessionRole::Local, PlayerId::HOST, GameState::default());

    let outcome = local.submit(spawn_at(32)).unwrap();

    let DispatchOutcome::Rejected { stage, result } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(stage, RejectionStage::Admission);
    assert_eq!(result.status(), game_core::Status::NotInEditorMode);
}

#[test]
fn query_failure_is_reported_with_stage() {
    let mut local = dispatcher(SessionRole::Local, PlayerId::HOST, editor_state());

    // No path on tile (5, 1).
    let outcome = local.submit(spawn_at(5 * 32)).unwrap();

    let DispatchOutcome::Rejected { stage, result } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(stage, RejectionStage::Query);
    assert_eq!(
        result.error_message(),
        Some(game_core::StringId::CAN_ONLY_BE_BUILT_ACROSS_PATHS)
    );
    assert!(local.state().peep_spawns.is_empty());
}

#[test]
fn host_applies_at_target_tick() {
    let mut host = dispatcher(SessionRole::Host, PlayerId::HOST, editor_state());

    let outcome = host.submit(spawn_at(32)).unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Queued {
            key: QueueKey::new(Tick(1), 0)
        }
    );

    let first = host.advance_tick().unwrap();
    assert!(first.applied.is_empty());
    assert!(host.state().peep_spawns.is_empty());

    let second = host.advance_tick().unwrap();
    assert_eq!(second.tick, Tick(1));
    assert_eq!(second.applied.len(), 1);
    assert_eq!(host.state().peep_spawns.len(), 1);
    assert_eq!(host.state().tick, Tick(2));
    assert_eq!(second.checksum, host.state().checksum());
}

#[test]
fn client_follows_host_commits() {
    let (mut host, mut client) = session();
    assert!(client.is_synchronized());

    host.submit(spawn_at(32)).unwrap();
    pump(&mut host, &mut client);
    pump(&mut client, &mut host);

    for _ in 0..2 {
        host.advance_tick().unwrap();
        pump(&mut host, &mut client);
    }

    assert!(client.is_synchronized());
    assert_eq!(client.state(), host.state());
    assert_eq!(client.state().peep_spawns.len(), 1);
}

#[test]
fn client_request_is_sequenced_by_host() {
    let (mut host, mut client) = session();

    let outcome = client.submit(GameCommand::new(TogglePauseAction)).unwrap();
    assert_eq!(outcome, DispatchOutcome::Forwarded { network_id: 0 });
    assert!(!client.state().session.paused);

    pump(&mut client, &mut host);
    pump(&mut host, &mut client);
    let queued = action_outcomes(&client.take_events());
    assert!(matches!(queued.as_slice(), [DispatchOutcome::Queued { .. }]));

    pump(&mut client, &mut host);
    for _ in 0..2 {
        host.advance_tick().unwrap();
        pump(&mut host, &mut client);
    }

    assert!(host.state().session.paused);
    assert!(client.state().session.paused);
    assert!(client.is_synchronized());
}

#[test]
fn release_waits_for_acks_until_deadline() {
    let (mut host, mut client) = session();

    host.submit(spawn_at(32)).unwrap();
    pump(&mut host, &mut client);
    // The client's ack is never delivered.
    client.take_outbox();

    host.advance_tick().unwrap();
    let blocked = host.advance_tick().unwrap();
    assert!(blocked.applied.is_empty());

    let deadline = DispatchConfig::default().ack_deadline_ticks;
    let mut applied = 0;
    for _ in 0..deadline {
        applied += host.advance_tick().unwrap().applied.len();
    }
    assert_eq!(applied, 1);
    assert_eq!(host.state().peep_spawns.len(), 1);
}

#[test]
fn host_rejects_unauthorized_request() {
    let (mut host, _client) = session();
    let request = GameCommand::new(SetSandboxModeAction::new(true));
    let frame = codec::encode(&request);

    host.handle_message(CLIENT, NetMessage::ActionRequest { frame })
        .unwrap();

    let outbox = host.take_outbox();
    assert_eq!(outbox.len(), 1);
    let NetMessage::ActionRejected { stage, result, .. } = &outbox[0].message else {
        panic!("expected rejection, got {:?}", outbox[0].message);
    };
    assert_eq!(*stage, RejectionStage::Admission);
    assert_eq!(result.error_message(), Some(game_core::StringId::ONLY_HOST));
    assert_eq!(host.status().pending, 0);
}

#[test]
fn request_from_unknown_peer_is_dropped() {
    let mut host = dispatcher(SessionRole::Host, PlayerId::HOST, editor_state());
    let frame = codec::encode(&GameCommand::new(TogglePauseAction));

    host.handle_message(PlayerId(7), NetMessage::ActionRequest { frame })
        .unwrap();

    assert_eq!(
        action_outcomes(&host.take_events()),
        vec![DispatchOutcome::Dropped {
            reason: DropReason::OriginDisconnected
        }]
    );
    assert_eq!(host.status().pending, 0);
    assert!(host.take_outbox().is_empty());
}

#[test]
fn stale_precondition_fails_on_execute() {
    let (mut host, _client) = session();
    let command = GameCommand::new(SetPlayerGroupAction::new(CLIENT, Roster::ADMIN_GROUP));

    let queued = host.submit(command).unwrap();
    assert!(matches!(queued, DispatchOutcome::Queued { .. }));

    host.disconnect_peer(CLIENT).unwrap();
    host.advance_tick().unwrap();
    let report = host.advance_tick().unwrap();

    let [(_, DispatchOutcome::Failed(result))] = report.applied.as_slice() else {
        panic!("expected a failed action, got {:?}", report.applied);
    };
    assert_eq!(
        result.error_message(),
        Some(game_core::StringId::PLAYER_NOT_FOUND)
    );
    assert_eq!(host.world().registry().group_of(CLIENT), None);
}

#[test]
fn checksum_mismatch_desynchronizes_client() {
    let (_host, mut client) = session();

    client
        .handle_message(
            PlayerId::HOST,
            NetMessage::TickCommit {
                tick: Tick::ZERO,
                keys: Vec::new(),
                checksum: [0xAB; 32],
            },
        )
        .unwrap();

    assert!(!client.is_synchronized());
    assert!(client.take_events().iter().any(|event| matches!(
        event,
        Event::Session(SessionEvent::Desynchronized { .. })
    )));

    // Later commits are ignored until a snapshot arrives.
    let tick = client.state().tick;
    client
        .handle_message(
            PlayerId::HOST,
            NetMessage::TickCommit {
                tick,
                keys: Vec::new(),
                checksum: [0; 32],
            },
        )
        .unwrap();
    assert_eq!(client.state().tick, tick);
}

#[test]
fn commit_naming_unknown_action_desynchronizes() {
    let (_host, mut client) = session();

    client
        .handle_message(
            PlayerId::HOST,
            NetMessage::TickCommit {
                tick: Tick::ZERO,
                keys: vec![QueueKey::new(Tick::ZERO, 3)],
                checksum: [0; 32],
            },
        )
        .unwrap();

    assert!(!client.is_synchronized());
}

#[test]
fn snapshot_resynchronizes_joining_peer() {
    let mut host = dispatcher(SessionRole::Host, PlayerId::HOST, editor_state());
    host.submit(spawn_at(32)).unwrap();
    host.advance_tick().unwrap();
    host.advance_tick().unwrap();
    host.submit(spawn_at(64)).unwrap();

    let mut client = dispatcher(SessionRole::Client, CLIENT, GameState::default());
    assert!(!client.is_synchronized());
    host.connect_peer(CLIENT).unwrap();
    pump(&mut host, &mut client);

    assert!(client.is_synchronized());
    assert_eq!(client.state(), host.state());
    assert_eq!(client.status().pending, 1);
    assert_eq!(client.world().registry().group_of(CLIENT), Some(Roster::GUEST_GROUP));

    pump(&mut client, &mut host);
    for _ in 0..2 {
        host.advance_tick().unwrap();
        pump(&mut host, &mut client);
    }
    assert!(client.is_synchronized());
    assert_eq!(client.state(), host.state());
    assert_eq!(client.state().peep_spawns.len(), 2);
}

#[test]
fn losing_host_drops_in_flight_requests() {
    let (_host, mut client) = session();
    client.submit(GameCommand::new(TogglePauseAction)).unwrap();
    client.take_events();

    client.disconnect_peer(PlayerId::HOST).unwrap();

    assert!(!client.is_synchronized());
    assert_eq!(
        action_outcomes(&client.take_events()),
        vec![DispatchOutcome::Dropped {
            reason: DropReason::HostDisconnected
        }]
    );
}

#[test]
fn clients_cannot_drive_the_clock() {
    let (_host, mut client) = session();

    let error = client.advance_tick().unwrap_err();

    assert!(matches!(
        error,
        DispatchError::NotPermitted {
            role: SessionRole::Client,
            ..
        }
    ));
}

#[test]
fn malformed_bytes_name_the_offending_peer() {
    let (mut host, _client) = session();

    let error = host.receive(CLIENT, &[0xFF, 0xFF, 0xFF]).unwrap_err();
    assert_eq!(error.offending_peer(), Some(CLIENT));

    let frame = vec![0, 0, 0, 9];
    let error = host
        .handle_message(CLIENT, NetMessage::ActionRequest { frame })
        .unwrap_err();
    assert!(matches!(error, DispatchError::Decode { peer, .. } if peer == CLIENT));
}

#[test]
fn peers_cannot_impersonate_the_host() {
    let (_host, mut client) = session();

    let error = client
        .handle_message(
            PlayerId(5),
            NetMessage::TickCommit {
                tick: Tick::ZERO,
                keys: Vec::new(),
                checksum: [0; 32],
            },
        )
        .unwrap_err();

    assert_eq!(error.offending_peer(), Some(PlayerId(5)));
}

#[test]
fn desynchronized_client_requests_snapshot_and_recovers() {
    let (mut host, mut client) = session();

    client
        .handle_message(
            PlayerId::HOST,
            NetMessage::TickCommit {
                tick: Tick::ZERO,
                keys: Vec::new(),
                checksum: [0xAB; 32],
            },
        )
        .unwrap();
    assert!(!client.is_synchronized());
    let request = client.take_outbox();
    assert!(matches!(
        request.as_slice(),
        [Outgoing {
            to: PlayerId::HOST,
            message: NetMessage::ResyncRequest { .. }
        }]
    ));

    // The host keeps going while the request is in transit.
    for _ in 0..40 {
        host.submit(GameCommand::new(TogglePauseAction)).unwrap();
        host.advance_tick().unwrap();
        pump(&mut host, &mut client);
    }
    assert_eq!(client.status().pending, 0);
    assert!(client.take_outbox().is_empty(), "desynchronized client must not ack");

    for outgoing in request {
        let bytes = outgoing.message.encode().unwrap();
        host.receive(CLIENT, &bytes).unwrap();
    }
    pump(&mut host, &mut client);

    assert!(client.is_synchronized());
    assert_eq!(client.state(), host.state());
    assert_eq!(client.status().pending, host.status().pending);

    host.submit(spawn_at(32)).unwrap();
    pump(&mut host, &mut client);
    pump(&mut client, &mut host);
    for _ in 0..2 {
        host.advance_tick().unwrap();
        pump(&mut host, &mut client);
    }
    assert!(client.is_synchronized());
    assert_eq!(client.state(), host.state());
}

#[test]
fn reconnecting_peer_keeps_its_group() {
    let (mut host, mut client) = session();
    host.submit(GameCommand::new(SetPlayerGroupAction::new(
        CLIENT,
        Roster::ADMIN_GROUP,
    )))
    .unwrap();
    pump(&mut host, &mut client);
    pump(&mut client, &mut host);
    for _ in 0..2 {
        host.advance_tick().unwrap();
        pump(&mut host, &mut client);
    }
    assert_eq!(host.world().registry().group_of(CLIENT), Some(Roster::ADMIN_GROUP));
    host.take_events();

    host.connect_peer(CLIENT).unwrap();

    let outbox = host.take_outbox();
    assert!(matches!(
        outbox.as_slice(),
        [Outgoing {
            message: NetMessage::StateSnapshot { .. },
            ..
        }]
    ));
    assert!(host.take_events().is_empty());
    for outgoing in outbox {
        let bytes = outgoing.message.encode().unwrap();
        client.receive(PlayerId::HOST, &bytes).unwrap();
    }

    assert_eq!(host.world().registry().group_of(CLIENT), Some(Roster::ADMIN_GROUP));
    assert_eq!(client.world().registry().group_of(CLIENT), Some(Roster::ADMIN_GROUP));
    assert_eq!(host.status().peers, vec![CLIENT]);
}
