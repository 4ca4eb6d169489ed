use chess_pgn::{CommentPosition, MoveNode};

/// Anderssen's "Evergreen" with a couple of sidelines and annotations.
pub const EVERGREEN: &str = r#"[Event "Casual Game"]
[Site "Berlin GER"]
[Date "1852.??.??"]
[Round "?"]
[White "Adolf Anderssen"]
[Black "Jean Dufresne"]
[Result "1-0"]
[ECO "C52"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. b4 {The Evans Gambit.} Bxb4 5. c3 Ba5 6. d4
exd4 7. O-O d3 (7... dxc3 8. Qb3 Qf6 (8... Qe7 9. Nxc3) 9. e5) 8. Qb3 Qf6 9. e5 $1
Qg6 10. Re1 Nge7 11. Ba3 b5 $6 12. Qxb5 Rb8 13. Qa4 Bb6 14. Nbd2 Bb7 15. Ne4 Qf5
16. Bxd3 Qh5 17. Nf6+ gxf6 18. exf6 Rg8 19. Rad1 Qxf3 20. Rxe7+ Nxe7 21. Qxd7+
Kxd7 22. Bf5+ Ke8 23. Bd7+ Kf8 24. Bxe7# 1-0
"#;

/// Short online game carrying engine evaluations and clocks.
pub const CLOCKED: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org"]
[White "alpha"]
[Black "beta"]
[Result "0-1"]
[TimeControl "180+0"]

1. e4 { [%eval 0.3] [%clk 0:03:00] } 1... e5 { [%eval 0.25] [%clk 0:02:58] }
2. Qh5 { [%eval -0.6] [%clk 0:02:55] } 2... Nc6 { [%eval -0.5] [%clk 0:02:50] }
3. Bc4 { [%eval -0.6] } 3... g6 { [%eval 0.1] } 4. Qf3 { [%eval -0.2] } 4... Nf6
{ [%eval #-4] Black must be careful here } 0-1
"#;

#[allow(dead_code)]
/// Flatten a line into comparable tokens: SAN, comments with their side,
/// NAGs, and bracketed variations.
pub fn describe(line: &[MoveNode]) -> Vec<String> {
    let mut out = Vec::new();
    for node in line {
        for text in node.annotation.comments_at(CommentPosition::Before) {
            out.push(format!("<{}", text));
        }
        out.push(node.san.clone());
        for code in &node.annotation.nags {
            out.push(format!("${}", code));
        }
        for text in node.annotation.comments_at(CommentPosition::After) {
            out.push(format!(">{}", text));
        }
        for variation in &node.variations {
            out.push("(".to_string());
            out.extend(describe(&variation.moves));
            out.push(")".to_string());
        }
    }
    out
}
