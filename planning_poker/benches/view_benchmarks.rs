use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use planning_poker::{
    EstimateOption, Player, PlayersById, Room, RoomId, RoomView, count_estimates,
    map_room_players,
};
use uuid::Uuid;

/// Room with `n` seated players, every other one holding a vote
fn setup_room(n: usize) -> (Room, PlayersById) {
    let players: Vec<Player> = (0..n)
        .map(|i| {
            let mut player = Player::new(Uuid::new_v4(), format!("player{}", i));
            if i % 2 == 0 {
                let card = EstimateOption::ALL[i % EstimateOption::ALL.len()];
                player.estimate = Some(card.as_str().to_string());
            }
            player
        })
        .collect();

    let mut room = Room::new(players[0].id, 0);
    room.players = players.iter().map(|p| p.id).collect();
    room.reveal_estimates = true;

    let lookup = players.into_iter().map(|p| (p.id, p)).collect();
    (room, lookup)
}

fn bench_project_room(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_room");

    for n in [4, 16, 64] {
        let (room, players) = setup_room(n);
        let room_id: RoomId = "123456".parse().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| RoomView::project(room_id.clone(), &room, &players));
        });
    }

    group.finish();
}

fn bench_count_estimates(c: &mut Criterion) {
    let (room, players) = setup_room(64);
    let seated = map_room_players(&room.players, &players);

    c.bench_function("count_estimates_64", |b| {
        b.iter(|| count_estimates(&seated, &EstimateOption::ALL));
    });
}

criterion_group!(benches, bench_project_room, bench_count_estimates);
criterion_main!(benches);
