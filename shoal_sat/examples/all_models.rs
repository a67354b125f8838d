use shoal_sat::{
    config::Config,
    reports::Report,
    solver::Solver,
    structures::literal::{CLiteral, Literal},
};

/// A default solver is created with an atom for each character of a word, and a further atom which is assumed true.
/// A loop then feeds back the negation of any model found, until the formula is unsatisfiable.
///
/// This is not particularly efficient.
fn main() {
    let mut solver = Solver::from_config(Config::default());

    let word = "model";
    let mut atom_map = vec!['䷼'];
    for character in word.chars() {
        atom_map.push(character);
    }
    let literals = solver.fresh_or_max_literals(word.len());

    let plural = solver.fresh_or_max_atom();
    atom_map.push('s');

    let mut count = 0;
    while let Ok(Report::Satisfiable) = solver.solve_given(&[CLiteral::new(plural, true)]) {
        count += 1;

        let Some(model) = solver.model() else {
            break;
        };

        let model_as_chars = model
            .iter()
            .map(|literal| match literal.polarity() {
                true => format!(" {}", atom_map[literal.atom() as usize]),
                false => format!("-{}", atom_map[literal.atom() as usize]),
            })
            .collect::<Vec<_>>();
        println!("v {count}\t {}", model_as_chars.join(" "));

        let blocking = model
            .iter()
            .filter(|literal| literal.atom() != plural)
            .map(|literal| literal.negate())
            .collect::<Vec<_>>();

        if solver.add_clause(blocking).is_err() {
            break;
        }
    }

    assert_eq!(count, 2_usize.pow(literals.len() as u32));
}
